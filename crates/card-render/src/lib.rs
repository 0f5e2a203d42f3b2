pub mod assets;
pub mod fit;
pub mod fonts;
pub mod model;
pub mod records;
pub mod text;
pub mod units;

mod field;
mod raster;
mod types;

pub use field::render_field;
pub use fonts::FontBook;
pub use model::{Field, FontWeight, PHOTO_KEY, Record, Side, Template, TextAlign, Value};
pub use raster::render_card;
pub use records::load_records;
pub use types::{RenderError, Result};
pub use units::{PRINT_DPI, Scale};
