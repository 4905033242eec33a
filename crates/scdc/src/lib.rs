pub mod c_emit;
pub mod diagnostics;
pub mod language;
pub mod layout;
pub mod model;
pub mod schema;
pub mod template;
pub mod util;
pub mod validate;

mod scd;
