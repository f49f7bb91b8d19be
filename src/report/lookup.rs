//! Title lookup collaborators

use std::collections::HashMap;
use std::hash::BuildHasher;

/// Read-only mapping from node id to display title
pub trait TitleLookup {
    fn title(&self, id: u32) -> Option<&str>;
}

impl TitleLookup for [String] {
    fn title(&self, id: u32) -> Option<&str> {
        self.get(id as usize).map(String::as_str)
    }
}

impl TitleLookup for Vec<String> {
    fn title(&self, id: u32) -> Option<&str> {
        self.as_slice().title(id)
    }
}

impl<S: BuildHasher> TitleLookup for HashMap<u32, String, S> {
    fn title(&self, id: u32) -> Option<&str> {
        self.get(&id).map(String::as_str)
    }
}
