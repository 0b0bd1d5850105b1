//! ODT ⇄ HTML transcoding.
//!
//! - `mapping`: element, attribute and style-property name tables
//! - `to_html`: `content.xml` tree → HTML document
//! - `to_odt`: HTML document → `content.xml`
//! - `normalize`: canonical markup form used by the round-trip checks

pub mod mapping;
pub mod normalize;
pub mod to_html;
pub mod to_odt;

pub use normalize::normalize;
pub use to_html::{ImageResolver, to_html};
pub use to_odt::to_odt;
