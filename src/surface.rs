use druid::{Point, Rect};

use crate::store::{SavedBox, SavedState};

/// Identifier of one touch contact, as reported by the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u32);

/// The pointer id a single-pointer host (mouse) reports for every event.
pub const PRIMARY_POINTER: PointerId = PointerId(0);

/// One pointer event, already classified by phase by the host shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { pointer: PointerId, pos: Point },
    Move { pointer: PointerId, pos: Point },
    Up { pointer: PointerId, pos: Point },
    Cancel,
    /// An additional contact landed while a gesture is already in progress.
    SecondaryDown { pointer: PointerId, pos: Point },
    /// A contact lifted while at least one other contact remains.
    SecondaryUp { pointer: PointerId },
}

/// An axis-aligned box given by its two drag corners.
///
/// `start` is fixed when the gesture begins; `end` follows the active
/// pointer until the gesture finishes. The corners may coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxRect {
    pub start: Point,
    pub end: Point,
}

impl BoxRect {
    fn new(p: Point) -> Self {
        BoxRect { start: p, end: p }
    }

    /// Normalised bounding rectangle of the two corners.
    pub fn frame(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Idle,
    /// `current` indexes the in-progress box, always the last one appended.
    Tracking { pointer: PointerId, current: usize },
}

/// Drawing surface state: the committed box list plus the transient
/// gesture being dragged out.
///
/// All operations are total. Events carrying a pointer id the surface is
/// not tracking fall through as no-ops rather than errors. `handle`
/// reports whether the change is worth a repaint.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchDrawSurface {
    boxes: Vec<BoxRect>,
    gesture: Gesture,
    contacts: Vec<(PointerId, Point)>,
    last_touch: Point,
    angle: f64,
    secondary_down: bool,
    view_id: u32,
}

impl TouchDrawSurface {
    pub fn new(view_id: u32) -> Self {
        TouchDrawSurface {
            boxes: Vec::new(),
            gesture: Gesture::Idle,
            contacts: Vec::new(),
            last_touch: Point::ZERO,
            angle: 0.0,
            secondary_down: false,
            view_id,
        }
    }

    /// Committed boxes, oldest first. Paint order follows this order.
    pub fn boxes(&self) -> &[BoxRect] {
        &self.boxes
    }

    /// Rotation of the whole drawing, in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn view_id(&self) -> u32 {
        self.view_id
    }

    /// Last position seen from the contact driving the gesture.
    pub fn last_touch(&self) -> Point {
        self.last_touch
    }

    /// Frame of the box currently being dragged, if any.
    pub fn current_frame(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Tracking { current, .. } => self.boxes.get(current).map(BoxRect::frame),
            Gesture::Idle => None,
        }
    }

    /// Feed one pointer event through the state machine. Returns true when
    /// visible geometry changed and the host should repaint.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { pointer, pos } => self.down(pointer, pos),
            PointerEvent::Move { pointer, pos } => self.pointer_move(pointer, pos),
            PointerEvent::Up { pointer, pos } => self.up(pointer, pos),
            PointerEvent::Cancel => self.cancel(),
            PointerEvent::SecondaryDown { pointer, pos } => self.secondary_down(pointer, pos),
            PointerEvent::SecondaryUp { pointer } => self.secondary_up(pointer),
        }
    }

    fn down(&mut self, pointer: PointerId, pos: Point) -> bool {
        self.boxes.push(BoxRect::new(pos));
        self.gesture = Gesture::Tracking {
            pointer,
            current: self.boxes.len() - 1,
        };
        self.angle = 0.0;
        self.last_touch = pos;
        self.touch(pointer, pos);
        tracing::debug!("down at ({:.1}, {:.1})", pos.x, pos.y);
        // The new box is zero-size, nothing to show yet.
        false
    }

    fn pointer_move(&mut self, pointer: PointerId, pos: Point) -> bool {
        self.touch(pointer, pos);
        let Gesture::Tracking { pointer: active, current } = self.gesture else {
            return false;
        };
        if pointer != active {
            return false;
        }
        if self.secondary_down {
            self.angle += 1.0;
        }
        self.last_touch = pos;
        self.boxes[current].end = pos;
        tracing::debug!(
            "move at ({:.1}, {:.1}), angle {:.0}",
            pos.x,
            pos.y,
            self.angle
        );
        true
    }

    fn up(&mut self, pointer: PointerId, pos: Point) -> bool {
        self.release(pointer);
        let Gesture::Tracking { pointer: active, current } = self.gesture else {
            return false;
        };
        if pointer != active {
            return false;
        }
        self.boxes[current].end = pos;
        self.gesture = Gesture::Idle;
        tracing::debug!("up at ({:.1}, {:.1}), {} boxes", pos.x, pos.y, self.boxes.len());
        true
    }

    fn cancel(&mut self) -> bool {
        let aborted = match self.gesture {
            Gesture::Tracking { current, .. } => {
                // The in-progress box never committed; drop it so the list
                // reads exactly as it did before the gesture began.
                self.boxes.remove(current);
                true
            }
            Gesture::Idle => false,
        };
        self.gesture = Gesture::Idle;
        self.contacts.clear();
        self.secondary_down = false;
        tracing::debug!("cancel, {} boxes", self.boxes.len());
        aborted
    }

    fn secondary_down(&mut self, pointer: PointerId, pos: Point) -> bool {
        self.secondary_down = true;
        self.last_touch = pos;
        self.touch(pointer, pos);
        tracing::debug!("secondary down at ({:.1}, {:.1})", pos.x, pos.y);
        false
    }

    fn secondary_up(&mut self, pointer: PointerId) -> bool {
        self.secondary_down = false;
        self.release(pointer);
        if let Gesture::Tracking { pointer: active, current } = self.gesture {
            if pointer == active {
                // The active contact lifted; hand the drag to a remaining
                // one so the gesture continues uninterrupted.
                if let Some(&(next, pos)) = self.contacts.first() {
                    self.gesture = Gesture::Tracking { pointer: next, current };
                    self.last_touch = pos;
                    tracing::debug!("active pointer {:?} lifted, now {:?}", pointer, next);
                }
            }
        }
        false
    }

    fn touch(&mut self, pointer: PointerId, pos: Point) {
        match self.contacts.iter_mut().find(|(id, _)| *id == pointer) {
            Some(entry) => entry.1 = pos,
            None => self.contacts.push((pointer, pos)),
        }
    }

    fn release(&mut self, pointer: PointerId) {
        self.contacts.retain(|(id, _)| *id != pointer);
    }

    pub fn save_state(&self) -> SavedState {
        SavedState {
            view_id: self.view_id,
            boxes: self.boxes.iter().map(SavedBox::from).collect(),
        }
    }

    pub fn restore_state(&mut self, saved: SavedState) {
        self.view_id = saved.view_id;
        self.boxes = saved.boxes.into_iter().map(BoxRect::from).collect();
        self.gesture = Gesture::Idle;
        self.contacts.clear();
        self.secondary_down = false;
        self.angle = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(s: &mut TouchDrawSurface, id: u32, x: f64, y: f64) -> bool {
        s.handle(PointerEvent::Down {
            pointer: PointerId(id),
            pos: Point::new(x, y),
        })
    }

    fn mv(s: &mut TouchDrawSurface, id: u32, x: f64, y: f64) -> bool {
        s.handle(PointerEvent::Move {
            pointer: PointerId(id),
            pos: Point::new(x, y),
        })
    }

    fn up(s: &mut TouchDrawSurface, id: u32, x: f64, y: f64) -> bool {
        s.handle(PointerEvent::Up {
            pointer: PointerId(id),
            pos: Point::new(x, y),
        })
    }

    fn secondary_down(s: &mut TouchDrawSurface, id: u32, x: f64, y: f64) -> bool {
        s.handle(PointerEvent::SecondaryDown {
            pointer: PointerId(id),
            pos: Point::new(x, y),
        })
    }

    fn secondary_up(s: &mut TouchDrawSurface, id: u32) -> bool {
        s.handle(PointerEvent::SecondaryUp {
            pointer: PointerId(id),
        })
    }

    #[test]
    fn drag_commits_one_box_with_down_and_up_corners() {
        let mut s = TouchDrawSurface::new(7);
        assert!(!down(&mut s, 0, 10.0, 10.0));
        assert!(mv(&mut s, 0, 30.0, 40.0));
        assert!(up(&mut s, 0, 50.0, 50.0));

        assert_eq!(s.boxes().len(), 1);
        assert_eq!(s.boxes()[0].start, Point::new(10.0, 10.0));
        assert_eq!(s.boxes()[0].end, Point::new(50.0, 50.0));
        assert_eq!(s.current_frame(), None);
    }

    #[test]
    fn up_without_move_commits_degenerate_box() {
        let mut s = TouchDrawSurface::new(0);
        down(&mut s, 0, 5.0, 5.0);
        up(&mut s, 0, 5.0, 5.0);

        assert_eq!(s.boxes().len(), 1);
        assert_eq!(s.boxes()[0].start, s.boxes()[0].end);
        assert_eq!(s.boxes()[0].frame().area(), 0.0);
    }

    #[test]
    fn two_downs_without_up_keep_both_boxes_in_call_order() {
        let mut s = TouchDrawSurface::new(0);
        down(&mut s, 0, 1.0, 1.0);
        down(&mut s, 0, 2.0, 2.0);

        assert_eq!(s.boxes().len(), 2);
        assert_eq!(s.boxes()[0].start, Point::new(1.0, 1.0));
        assert_eq!(s.boxes()[1].start, Point::new(2.0, 2.0));

        // Only the latest box is still being dragged.
        mv(&mut s, 0, 9.0, 9.0);
        assert_eq!(s.boxes()[0].end, Point::new(1.0, 1.0));
        assert_eq!(s.boxes()[1].end, Point::new(9.0, 9.0));
    }

    #[test]
    fn cancel_after_down_restores_previous_list() {
        let mut s = TouchDrawSurface::new(0);
        down(&mut s, 0, 1.0, 1.0);
        up(&mut s, 0, 4.0, 4.0);

        down(&mut s, 0, 10.0, 10.0);
        mv(&mut s, 0, 20.0, 20.0);
        assert!(s.handle(PointerEvent::Cancel));

        assert_eq!(s.boxes().len(), 1);
        assert_eq!(s.boxes()[0].end, Point::new(4.0, 4.0));
        assert_eq!(s.current_frame(), None);
    }

    #[test]
    fn cancel_on_empty_surface_yields_zero_boxes() {
        let mut s = TouchDrawSurface::new(0);
        down(&mut s, 0, 0.0, 0.0);
        s.handle(PointerEvent::Cancel);
        assert!(s.boxes().is_empty());
    }

    #[test]
    fn cancel_without_gesture_is_a_noop() {
        let mut s = TouchDrawSurface::new(0);
        assert!(!s.handle(PointerEvent::Cancel));
        assert!(s.boxes().is_empty());
    }

    #[test]
    fn moves_from_untracked_pointers_are_ignored() {
        let mut s = TouchDrawSurface::new(0);
        down(&mut s, 0, 10.0, 10.0);
        assert!(!mv(&mut s, 5, 90.0, 90.0));
        assert_eq!(s.boxes()[0].end, Point::new(10.0, 10.0));
    }

    #[test]
    fn move_without_gesture_is_a_noop() {
        let mut s = TouchDrawSurface::new(0);
        assert!(!mv(&mut s, 0, 10.0, 10.0));
        assert!(s.boxes().is_empty());
    }

    #[test]
    fn secondary_lift_hands_the_drag_to_the_remaining_contact() {
        let mut s = TouchDrawSurface::new(0);
        down(&mut s, 0, 0.0, 0.0);
        secondary_down(&mut s, 1, 100.0, 100.0);
        secondary_up(&mut s, 0);

        // Touch tracking is reseeded from the surviving contact.
        assert_eq!(s.last_touch(), Point::new(100.0, 100.0));

        // The drag continues under the surviving pointer.
        assert!(mv(&mut s, 1, 60.0, 70.0));
        assert_eq!(s.boxes()[0].end, Point::new(60.0, 70.0));

        assert!(up(&mut s, 1, 80.0, 80.0));
        assert_eq!(s.boxes()[0].start, Point::new(0.0, 0.0));
        assert_eq!(s.boxes()[0].end, Point::new(80.0, 80.0));
    }

    #[test]
    fn secondary_lift_of_inactive_pointer_keeps_the_active_one() {
        let mut s = TouchDrawSurface::new(0);
        down(&mut s, 0, 0.0, 0.0);
        secondary_down(&mut s, 1, 100.0, 100.0);
        secondary_up(&mut s, 1);

        assert!(mv(&mut s, 0, 5.0, 5.0));
        assert_eq!(s.boxes()[0].end, Point::new(5.0, 5.0));
        assert!(!mv(&mut s, 1, 50.0, 50.0));
    }

    #[test]
    fn angle_advances_only_while_a_secondary_contact_is_held() {
        let mut s = TouchDrawSurface::new(0);
        down(&mut s, 0, 0.0, 0.0);
        mv(&mut s, 0, 1.0, 1.0);
        assert_eq!(s.angle(), 0.0);

        secondary_down(&mut s, 1, 50.0, 50.0);
        mv(&mut s, 0, 2.0, 2.0);
        mv(&mut s, 0, 3.0, 3.0);
        assert_eq!(s.angle(), 2.0);

        secondary_up(&mut s, 1);
        mv(&mut s, 0, 4.0, 4.0);
        assert_eq!(s.angle(), 2.0);

        // A fresh gesture starts unrotated.
        up(&mut s, 0, 4.0, 4.0);
        down(&mut s, 0, 0.0, 0.0);
        assert_eq!(s.angle(), 0.0);
    }

    #[test]
    fn saved_state_round_trips_identifier_and_geometry() {
        let mut s = TouchDrawSurface::new(42);
        down(&mut s, 0, 10.0, 10.0);
        up(&mut s, 0, 50.0, 50.0);
        down(&mut s, 0, 60.0, 60.0);
        up(&mut s, 0, 61.0, 62.0);

        let mut restored = TouchDrawSurface::new(0);
        restored.restore_state(s.save_state());

        assert_eq!(restored.view_id(), 42);
        assert_eq!(restored.boxes(), s.boxes());
        assert_eq!(restored.current_frame(), None);
    }

    #[test]
    fn restore_discards_an_in_progress_gesture() {
        let mut s = TouchDrawSurface::new(0);
        down(&mut s, 0, 1.0, 1.0);
        up(&mut s, 0, 2.0, 2.0);
        let saved = s.save_state();

        down(&mut s, 0, 8.0, 8.0);
        s.restore_state(saved);

        assert_eq!(s.boxes().len(), 1);
        assert!(!mv(&mut s, 0, 9.0, 9.0));
    }
}
