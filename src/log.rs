use std::fmt::Display;

use colored::{Color, Colorize};

/// Coloured category tag printed in front of every log line.
pub struct Prefix(&'static str, Color);

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.color(self.1).bold())
    }
}

pub const STYLE: Prefix = Prefix("[style]", Color::Magenta);
pub const GEOMETRY: Prefix = Prefix("[geom]", Color::Blue);
pub const MODE: Prefix = Prefix("[mode]", Color::Cyan);
pub const SCREEN: Prefix = Prefix("[screen]", Color::Green);
pub const COMPLICATION: Prefix = Prefix("[comp]", Color::BrightBlue);
pub const TIMER: Prefix = Prefix("[timer]", Color::BrightBlack);
pub const HOST: Prefix = Prefix("[host]", Color::White);
pub const CONFIG: Prefix = Prefix("[config]", Color::Yellow);
pub const WARN: Prefix = Prefix("[warn]", Color::BrightYellow);
pub const ERROR: Prefix = Prefix("[error]", Color::Red);
