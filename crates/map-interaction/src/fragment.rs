// Copyright 2025 Chris Custine
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

//! Typed rich-text fragments for the details dialog.
//!
//! A fragment is a single paragraph of text runs, links and line breaks.
//! It renders to escaped HTML with [`DetailFragment::to_html`] or can be
//! walked line by line by a native UI via [`DetailFragment::lines`].

use std::fmt::Write as _;

/// Where a link opens, and how its `target` attribute is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// No `target` attribute.
    Same,
    /// ` target="_blank"`
    Blank,
    /// `  target="_blank"`, two spaces before the attribute as in the website line.
    BlankWide,
}

impl LinkTarget {
    fn attribute(self) -> &'static str {
        match self {
            Self::Same => "",
            Self::Blank => " target=\"_blank\"",
            Self::BlankWide => "  target=\"_blank\"",
        }
    }
}

/// One piece of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link {
        href: String,
        label: String,
        target: LinkTarget,
    },
    Break,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFragment {
    inlines: Vec<Inline>,
}

impl DetailFragment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if let Some(Inline::Text(last)) = self.inlines.last_mut() {
            last.push_str(&text);
        } else {
            self.inlines.push(Inline::Text(text));
        }
        self
    }

    #[must_use]
    pub fn link(mut self, href: impl Into<String>, label: impl Into<String>, target: LinkTarget) -> Self {
        self.inlines.push(Inline::Link {
            href: href.into(),
            label: label.into(),
            target,
        });
        self
    }

    #[must_use]
    pub fn line_break(mut self) -> Self {
        self.inlines.push(Inline::Break);
        self
    }

    /// Inlines grouped into visual lines (split at breaks).
    #[must_use]
    pub fn lines(&self) -> Vec<&[Inline]> {
        self.inlines.split(|i| *i == Inline::Break).collect()
    }

    /// Render as a `<p>` element with all text and attribute values escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<p>");
        for inline in &self.inlines {
            match inline {
                Inline::Text(text) => html.push_str(&escape(text)),
                Inline::Break => html.push_str("<br>"),
                Inline::Link { href, label, target } => {
                    let _ = write!(
                        html,
                        "<a href=\"{}\"{}>{}</a>",
                        escape(href),
                        target.attribute(),
                        escape(label)
                    );
                }
            }
        }
        html.push_str("</p>");
        html
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_rendering() {
        let fragment = DetailFragment::new()
            .text("Address: ")
            .text("Main 1")
            .line_break()
            .text("Website: ")
            .link("https://example.org", "https://example.org", LinkTarget::BlankWide)
            .line_break()
            .link("geo:0,0", "map", LinkTarget::Blank);

        assert_eq!(
            fragment.to_html(),
            concat!(
                "<p>Address: Main 1<br>Website: <a href=\"https://example.org\"  target=\"_blank\">https://example.org</a>",
                "<br><a href=\"geo:0,0\" target=\"_blank\">map</a></p>"
            )
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let fragment = DetailFragment::new()
            .text("<script>alert('x')</script>")
            .link("\"><img src=x>", "a & b", LinkTarget::Same);

        assert_eq!(
            fragment.to_html(),
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;<a href=\"&quot;&gt;&lt;img src=x&gt;\">a &amp; b</a></p>"
        );
    }

    #[test]
    fn test_lines_split_at_breaks() {
        let fragment = DetailFragment::new()
            .text("one")
            .line_break()
            .text("two ")
            .link("geo:0,0", "map", LinkTarget::Blank);

        let lines = fragment.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], &[Inline::Text("one".to_string())]);
        assert_eq!(lines[1].len(), 2);
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        let fragment = DetailFragment::new().text("a").text("b");
        assert_eq!(fragment.lines(), vec![&[Inline::Text("ab".to_string())][..]]);
    }
}
