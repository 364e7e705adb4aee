use colored::Color;

pub const PRIMARY: Color = Color::BrightCyan;
pub const TEXT_DEFAULT: Color = Color::White;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const FAILURE: Color = Color::Red;
