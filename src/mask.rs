pub mod brush;
pub mod preview;
pub mod stroke;
pub mod surface;
