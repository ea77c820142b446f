// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// The optional capabilities a driver advertises, as extension names.
///
/// Lookups match on substrings, so `"texture_float"` finds
/// `"GL_OES_texture_float"` regardless of the vendor prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    names: Vec<String>,
}

impl ExtensionSet {
    /// Splits a whitespace-separated extension string as drivers report it.
    pub fn parse(extensions: &str) -> Self {
        Self {
            names: extensions.split_whitespace().map(str::to_owned).collect(),
        }
    }

    /// Builds a set from individual names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// `true` if any advertised extension contains `fragment`.
    pub fn contains(&self, fragment: &str) -> bool {
        self.find(fragment).is_some()
    }

    /// The first advertised extension containing `fragment`.
    pub fn find(&self, fragment: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|name| name.contains(fragment))
            .map(String::as_str)
    }

    /// Number of advertised extensions.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` if the driver advertised nothing.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the advertised names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_any_whitespace() {
        let set = ExtensionSet::parse("  GL_OES_texture_float\tGL_EXT_sRGB\nGL_OES_depth_texture ");
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            ["GL_OES_texture_float", "GL_EXT_sRGB", "GL_OES_depth_texture"]
        );
    }

    #[test]
    fn lookups_match_substrings() {
        let set = ExtensionSet::parse("GL_OES_texture_float_linear GL_EXT_shader_framebuffer_fetch");
        assert!(set.contains("texture_float"));
        assert!(set.contains("texture_float_linear"));
        assert!(set.contains("framebuffer_fetch"));
        assert!(!set.contains("texture_half_float"));
        assert_eq!(
            set.find("framebuffer_fetch"),
            Some("GL_EXT_shader_framebuffer_fetch")
        );
    }

    #[test]
    fn empty_string_yields_empty_set() {
        let set = ExtensionSet::parse("");
        assert!(set.is_empty());
        assert!(!set.contains("anything"));
    }
}
