//! XML input helpers and output tree.

mod utils;
mod writer;

pub use utils::{child_elements, child_elements_named, element_text, is_element_named, local_name};
pub use writer::{XmlDocument, XmlElement, XmlNode};
