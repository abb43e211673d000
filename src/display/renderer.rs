use debug_print::debug_println;

use crate::{
    assets::AssetStore,
    geometry::GeometryState,
    log,
    style::{StyleConfig, COMPLICATION_COUNT},
};

use super::{
    components::{
        background::Background, clock_face::ClockFace, complication::ComplicationView,
        DisplayAreaType, FaceComponent, FrameContext,
    },
    surface::FrameBuffer,
    RenderError,
};

/// Names of the components that drew something, bottom first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub drawn: Vec<String>,
}

/// Draws background, complications and clock face, in that order, into a
/// frame sized to the surface.
pub struct FrameRenderer {
    components: Vec<Box<dyn FaceComponent>>,
    target: Option<FrameBuffer>,
}

impl FrameRenderer {
    pub fn new() -> Self {
        let mut components: Vec<Box<dyn FaceComponent>> = vec![Box::new(Background::new())];
        for index in 0..COMPLICATION_COUNT {
            components.push(Box::new(ComplicationView::new(index)));
        }
        components.push(Box::new(ClockFace::new()));
        // Stable, so slots keep their order.
        components.sort_by_key(|component| component.get_z_index());

        Self {
            components,
            target: None,
        }
    }

    pub fn resize(
        &mut self,
        style: &StyleConfig,
        geometry: &GeometryState,
        assets: &dyn AssetStore,
    ) -> Result<(), RenderError> {
        self.target = Some(FrameBuffer::new(geometry.viewport.size()));
        for component in self.components.iter_mut() {
            component.resize(style, geometry, assets)?;
        }
        println!(
            "{} Frame is {}x{}",
            log::SCREEN,
            geometry.viewport.width,
            geometry.viewport.height
        );
        Ok(())
    }

    pub fn render(&mut self, frame: &FrameContext) -> Result<FrameReport, RenderError> {
        let target = self.target.as_mut().ok_or(RenderError::NoSurface)?;

        let mut report = FrameReport::default();
        for component in self.components.iter_mut() {
            if let DisplayAreaType::Slot(index) = component.get_type() {
                let off_screen = frame
                    .geometry
                    .complication_bounds
                    .get(index)
                    .map_or(true, |bounds| bounds.is_empty());
                if off_screen {
                    continue;
                }
            }
            if component.draw(target, frame)? {
                report.drawn.push(component.get_name().to_string());
            }
        }
        debug_println!("{} drew {}", log::SCREEN, report.drawn.join(", "));
        Ok(report)
    }

    /// Last rendered frame.
    pub fn frame(&self) -> Option<&FrameBuffer> {
        self.target.as_ref()
    }
}
