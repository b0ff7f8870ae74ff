//! Drawing the world onto a shell-supplied surface.

use glam::Vec2;
use lifepool_config::AgentSettings;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::energy_point::EnergyPoint;

/// Length of the direction tail relative to the unit heading
const TAIL_LENGTH: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BACKGROUND: Rgba = Rgba::new(10, 14, 30, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const WARNING: Rgba = Rgba::new(255, 80, 80, 200);
    pub const PREDATOR_OUTLINE: Rgba = Rgba::new(255, 40, 40, 255);
    pub const EXCLAMATION: Rgba = Rgba::new(255, 220, 60, 255);
    pub const ENERGY: Rgba = Rgba::new(120, 255, 160, 220);

    /// Color from hue (degrees), saturation and lightness in `[0, 1]`
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        let channel = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(r), channel(g), channel(b), 255)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Minimal 2D drawing interface the shell provides
pub trait Surface {
    fn clear(&mut self, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
    fn text(&mut self, position: Vec2, text: &str, color: Rgba);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawCommand {
    Clear { color: Rgba },
    FillCircle { center: Vec2, radius: f32, color: Rgba },
    StrokeCircle { center: Vec2, radius: f32, width: f32, color: Rgba },
    Line { from: Vec2, to: Vec2, width: f32, color: Rgba },
    Text { position: Vec2, text: String, color: Rgba },
}

/// A [`Surface`] that records draw calls so they can be shipped elsewhere
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for DisplayList {
    fn clear(&mut self, color: Rgba) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::StrokeCircle { center, radius, width, color });
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line { from, to, width, color });
    }

    fn text(&mut self, position: Vec2, text: &str, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            position,
            text: text.to_string(),
            color,
        });
    }
}

pub fn draw_agent(surface: &mut dyn Surface, agent: &Agent, settings: &AgentSettings) {
    let color = Rgba::from_hsl(agent.dna.hue, 0.7, 0.6);
    let size = agent.dna.size;

    surface.line(
        agent.position,
        agent.position - agent.velocity * TAIL_LENGTH,
        (size / 3.0).max(1.0),
        color.with_alpha(120),
    );
    surface.fill_circle(agent.position, size, color);

    if agent.is_predator() {
        surface.stroke_circle(agent.position, size + 1.5, 2.0, Rgba::PREDATOR_OUTLINE);
    }
    if agent.energy < settings.low_energy_display {
        surface.stroke_circle(agent.position, size + 3.0, 1.0, Rgba::WARNING);
    }
    if agent.timers.exclamation > 0 {
        surface.text(agent.position - Vec2::new(0.0, size + 8.0), "!", Rgba::EXCLAMATION);
    }
}

pub fn draw_energy_point(surface: &mut dyn Surface, point: &EnergyPoint) {
    let fade = if point.max_energy > 0.0 {
        (point.energy / point.max_energy).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let color = Rgba::ENERGY.with_alpha((60.0 + fade * 160.0) as u8);
    surface.fill_circle(point.position, point.radius().max(1.0), color);
}
