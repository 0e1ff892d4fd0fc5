//! Canvas view of a directory snapshot.
//!
//! Renders a [`DirectoryStructure`](crate::model::DirectoryStructure) through
//! the [`GraphRenderer`](crate::renderer::GraphRenderer) facade with:
//! - Force-directed 2D layout or a depth-layered, slowly orbiting 3D layout
//! - Pan, zoom, node dragging (pinned until double-clicked) and selection
//! - Rings and dashed incoming links for recently changed nodes
//!
//! # Example
//!
//! ```ignore
//! let structure = parse_payload(json)?;
//! let structure = Signal::stored(Arc::new(structure));
//!
//! view! {
//!     <DirectoryGraphCanvas
//!         structure=structure
//!         mode=RenderMode::Planar
//!         config=RenderConfig::default()
//!         fullscreen=true
//!     />
//! }
//! ```

mod component;
mod render;
mod state;
pub mod theme;

pub use component::DirectoryGraphCanvas;
pub use theme::Theme;
