//! SVG markup interchange.
//!
//! [`to_markup`] writes a [`Document`] as a standalone SVG 1.1 file and
//! [`from_markup`] reads one back. Anything written by `to_markup` reads
//! back as the same document, element for element.
//!
//! # Markup shape
//!
//! ```xml
//! <svg xmlns="http://www.w3.org/2000/svg" width="800" height="600" viewBox="0 0 800 600">
//!   <title>Untitled</title>
//!   <rect data-role="background" x="0" y="0" width="800" height="600" fill="#ffffff"/>
//!   <rect id="e1" x="10" y="10" width="100" height="50" fill="#ff0000"/>
//!   <g id="e2" fill="none" transform="matrix(1 0 0 1 20 0)">
//!     <circle id="e3" cx="0" cy="0" r="5" fill="#000000"/>
//!   </g>
//! </svg>
//! ```
//!
//! Reading is lenient towards files from other tools: unsupported elements
//! are skipped with a [`ParseWarning`], `line`/`polyline`/`polygon` become
//! paths, inline `style` declarations are honoured and missing or foreign
//! ids are replaced.

mod error;
mod read;
mod values;
mod write;

pub use error::{ParseError, ParseWarning, WriteError};
pub use read::{from_markup, Parsed};
pub use write::to_markup;

pub use node::Document;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Marks the rect that paints the document background.
pub const BACKGROUND_ROLE: &str = "background";
