//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::html_escape;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with default highlighting
    pub fn new() -> Self {
        Self::from_config(&HighlightConfig::default())
    }

    /// Create from the `highlight` config section
    pub fn from_config(config: &HighlightConfig) -> Self {
        let theme_set = ThemeSet::load_defaults();
        if config.enable && !theme_set.themes.contains_key(&config.theme) {
            tracing::warn!(
                "Unknown highlight theme `{}`, falling back to a bundled theme",
                config.theme
            );
        }
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme_name: config.theme.clone(),
            highlight: config.enable,
            line_numbers: config.line_number,
        }
    }

    /// Render markdown to HTML. Raw HTML in the source passes through.
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // (language, buffered source) while inside a code block
        let mut code: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, source)) = code.take() {
                        let block = self.highlight_code(&source, lang.as_deref());
                        events.push(Event::Html(CowStr::from(block)));
                    }
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, source)) = code.as_mut() {
                        source.push_str(&text);
                    }
                }
                other => {
                    if code.is_none() {
                        events.push(other);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.get("base16-ocean.dark"))
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang_class = lang.map(html_escape).unwrap_or_else(|| "text".to_string());
        let plain = || {
            format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang_class,
                html_escape(code)
            )
        };

        if !self.highlight {
            return plain();
        }
        let Some(theme) = self.theme() else {
            return plain();
        };

        let syntax = lang
            .and_then(|l| {
                self.syntax_set
                    .find_syntax_by_token(l)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(l))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) if self.line_numbers => {
                add_line_numbers(&highlighted, &lang_class, code.lines().count())
            }
            Ok(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                lang_class, highlighted
            ),
            Err(e) => {
                tracing::debug!("Highlighting failed for `{}`: {}", lang_class, e);
                plain()
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap highlighted code in a two-column table with a line number gutter
fn add_line_numbers(highlighted: &str, lang: &str, line_count: usize) -> String {
    let gutter = (1..=line_count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        lang, gutter, highlighted
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a *test*.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a <em>test</em>.</p>"));
    }

    #[test]
    fn test_render_extensions() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~\n\n- [x] done\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("<div class=\"note\">kept</div>\n");
        assert!(html.contains("<div class=\"note\">kept</div>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<figure class="highlight rust">"#));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_code_block_without_highlighting() {
        let config = HighlightConfig {
            enable: false,
            ..HighlightConfig::default()
        };
        let renderer = MarkdownRenderer::from_config(&config);
        let html = renderer.render("```\nlet x = 1 < 2;\n```");
        assert!(html.contains(r#"<pre><code class="language-text">let x = 1 &lt; 2;"#));
    }

    #[test]
    fn test_line_numbers() {
        let config = HighlightConfig {
            line_number: true,
            ..HighlightConfig::default()
        };
        let renderer = MarkdownRenderer::from_config(&config);
        let html = renderer.render("```python\na = 1\nb = 2\n```");
        assert!(html.contains(r#"<td class="gutter">"#));
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let config = HighlightConfig {
            theme: "no-such-theme".to_string(),
            ..HighlightConfig::default()
        };
        let renderer = MarkdownRenderer::from_config(&config);
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains("highlight"));
    }
}
