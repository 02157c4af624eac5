#![windows_subsystem = "windows"]

use anyhow::Result;
use druid::kurbo::Affine;
use druid::{
    AppLauncher, BoxConstraints, Color, Data, Env, Event, EventCtx, LayoutCtx, LifeCycle,
    LifeCycleCtx, PaintCtx, Rect, RenderContext, Size, UpdateCtx, Widget, WindowDesc,
};
use std::path::PathBuf;

mod logging;
mod store;
mod surface;

use surface::{PRIMARY_POINTER, PointerEvent, TouchDrawSurface};

const SURFACE_VIEW_ID: u32 = 1;

const BACKGROUND: Color = Color::rgba8(0xf8, 0xef, 0xe0, 0xff);
const BOX_FILL: Color = Color::rgba8(0xff, 0x00, 0x00, 0x22);
const BOX_OUTLINE: Color = Color::rgba8(0xff, 0x00, 0x00, 0x66);

#[derive(Clone, Data)]
struct AppState {
    #[data(same_fn = "PartialEq::eq")]
    surface: TouchDrawSurface,
}

// Widget implementation
struct DrawSurface {
    state_path: PathBuf,
    previous_rect: Option<Rect>,
}

impl DrawSurface {
    fn new(state_path: PathBuf) -> Self {
        DrawSurface {
            state_path,
            previous_rect: None,
        }
    }
}

impl Widget<AppState> for DrawSurface {
    fn event(&mut self, ctx: &mut EventCtx, event: &Event, data: &mut AppState, _env: &Env) {
        match event {
            Event::MouseDown(e) if e.button.is_left() => {
                data.surface.handle(PointerEvent::Down {
                    pointer: PRIMARY_POINTER,
                    pos: e.pos,
                });
                self.previous_rect = data.surface.current_frame();
            }

            Event::MouseMove(e) => {
                if data.surface.handle(PointerEvent::Move {
                    pointer: PRIMARY_POINTER,
                    pos: e.pos,
                }) {
                    let new_rect = data.surface.current_frame().unwrap_or(Rect::ZERO);
                    let old_rect = self.previous_rect.unwrap_or(new_rect);
                    self.previous_rect = Some(new_rect);
                    ctx.request_paint_rect(old_rect.union(new_rect).inset(2.0));
                }
            }

            Event::MouseUp(e) if e.button.is_left() => {
                if data.surface.handle(PointerEvent::Up {
                    pointer: PRIMARY_POINTER,
                    pos: e.pos,
                }) {
                    self.previous_rect = None;
                    let frame = data
                        .surface
                        .boxes()
                        .last()
                        .map(|b| b.frame())
                        .unwrap_or(Rect::ZERO);
                    ctx.request_paint_rect(frame.inset(2.0));
                }
            }

            Event::WindowCloseRequested => {
                if let Err(err) = store::save(&self.state_path, &data.surface.save_state()) {
                    tracing::warn!("failed to save drawing state: {err:#}");
                }
            }

            _ => {}
        }
    }

    fn lifecycle(
        &mut self,
        _ctx: &mut LifeCycleCtx,
        _event: &LifeCycle,
        _data: &AppState,
        _env: &Env,
    ) {
    }

    fn update(&mut self, _ctx: &mut UpdateCtx, _old: &AppState, _data: &AppState, _env: &Env) {
        // Repaint regions are requested in `event`, where the dirty rect is known.
    }

    fn layout(
        &mut self,
        _ctx: &mut LayoutCtx,
        bc: &BoxConstraints,
        _data: &AppState,
        _env: &Env,
    ) -> Size {
        bc.max()
    }

    fn paint(&mut self, ctx: &mut PaintCtx, data: &AppState, _env: &Env) {
        let full_rect = ctx.size().to_rect();
        ctx.fill(full_rect, &BACKGROUND);

        let angle = data.surface.angle().to_radians();
        for b in data.surface.boxes() {
            let frame = b.frame();
            ctx.with_save(|ctx| {
                ctx.transform(Affine::rotate(angle));
                ctx.fill(frame, &BOX_FILL);
                ctx.stroke(frame, &BOX_OUTLINE, 1.0);
            });
        }
    }
}

fn main() -> Result<()> {
    logging::init();

    let state_path = store::resolve_state_path()?;
    let mut surface = TouchDrawSurface::new(SURFACE_VIEW_ID);
    match store::load(&state_path) {
        Ok(Some(saved)) => {
            tracing::info!(
                "restored {} boxes from {}",
                saved.boxes.len(),
                state_path.display()
            );
            surface.restore_state(saved);
        }
        Ok(None) => {}
        Err(err) => tracing::warn!("failed to restore drawing state: {err:#}"),
    }

    let window = WindowDesc::new(DrawSurface::new(state_path))
        .title("Box Draw")
        .window_size((800.0, 600.0));
    AppLauncher::with_window(window).launch(AppState { surface })?;
    Ok(())
}
