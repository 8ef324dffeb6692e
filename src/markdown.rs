//! Markdown-to-terminal rendering.
//!
//! Pure and synchronous: `render(raw, width, theme)` parses markdown with
//! pulldown-cmark and produces styled, word-wrapped ratatui text. Callers
//! treat a failure as recoverable and keep their previous content.

use color_eyre::eyre::eyre;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use unicode_width::UnicodeWidthStr;

use crate::Theme;

/// Inputs past this size are rejected rather than rendered.
pub const MAX_INPUT_BYTES: usize = 512 * 1024;

/// A flat, semantic slice of the parsed document.
#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    InlineCode(String),
    Bold(String),
    Italic(String),
    Strikethrough(String),
    CodeBlock(String),
    SoftBreak,
    HardBreak,
    ParagraphEnd,
    Heading { level: u8, text: String },
    ListItemStart { ordered: bool, number: u64, depth: usize },
    ListItemEnd,
    BlockQuoteStart,
    BlockQuoteEnd,
    Rule,
    Link { text: String, url: String },
}

/// Render raw markdown into styled lines wrapped to `width` columns.
pub fn render(raw: &str, width: u16, theme: &Theme) -> color_eyre::Result<Text<'static>> {
    if raw.len() > MAX_INPUT_BYTES {
        return Err(eyre!(
            "markdown input is {} bytes, limit is {MAX_INPUT_BYTES}",
            raw.len()
        ));
    }
    let segments = parse(raw);
    Ok(Text::from(to_lines(&segments, width.max(10) as usize, theme)))
}

fn parse(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();

    let mut in_code_block = false;
    let mut code = String::new();
    let mut in_heading: Option<u8> = None;
    let mut heading = String::new();
    // (ordered, next item number) per nesting level.
    let mut list_stack: Vec<(bool, u64)> = Vec::new();

    // Inline emphasis accumulators.
    let mut in_bold = false;
    let mut in_italic = false;
    let mut in_strikethrough = false;
    let mut bold = String::new();
    let mut italic = String::new();
    let mut strikethrough = String::new();
    let mut in_link = false;
    let mut link_text = String::new();
    let mut link_url = String::new();

    let options = Options::ENABLE_STRIKETHROUGH;
    for event in Parser::new_ext(raw, options) {
        match event {
            Event::Code(text) => {
                if in_heading.is_some() {
                    heading.push_str(&text);
                } else {
                    segments.push(Segment::InlineCode(text.to_string()));
                }
            }
            Event::Start(Tag::Heading { level, .. }) => {
                in_heading = Some(match level {
                    HeadingLevel::H1 => 1,
                    HeadingLevel::H2 => 2,
                    HeadingLevel::H3 => 3,
                    HeadingLevel::H4 => 4,
                    HeadingLevel::H5 => 5,
                    HeadingLevel::H6 => 6,
                });
                heading.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = in_heading.take() {
                    segments.push(Segment::Heading {
                        level,
                        text: heading.clone(),
                    });
                }
                heading.clear();
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                code.clear();
            }
            Event::End(TagEnd::CodeBlock) => {
                segments.push(Segment::CodeBlock(code.clone()));
                in_code_block = false;
                code.clear();
            }
            Event::Text(text) if in_code_block => code.push_str(&text),
            Event::Text(text) if in_heading.is_some() => heading.push_str(&text),
            Event::Text(text) if in_link => link_text.push_str(&text),
            Event::Text(text) if in_bold => bold.push_str(&text),
            Event::Text(text) if in_italic => italic.push_str(&text),
            Event::Text(text) if in_strikethrough => strikethrough.push_str(&text),
            Event::Text(text) => segments.push(Segment::Text(text.to_string())),
            Event::SoftBreak => {
                if in_heading.is_some() {
                    heading.push(' ');
                } else {
                    segments.push(Segment::SoftBreak);
                }
            }
            Event::HardBreak => segments.push(Segment::HardBreak),
            Event::End(TagEnd::Paragraph) => segments.push(Segment::ParagraphEnd),
            Event::Start(Tag::List(first)) => {
                list_stack.push((first.is_some(), first.unwrap_or(1)));
            }
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
                if list_stack.is_empty() {
                    segments.push(Segment::ParagraphEnd);
                }
            }
            Event::Start(Tag::Item) => {
                let depth = list_stack.len();
                if let Some((ordered, number)) = list_stack.last_mut() {
                    segments.push(Segment::ListItemStart {
                        ordered: *ordered,
                        number: *number,
                        depth,
                    });
                    *number += 1;
                }
            }
            Event::End(TagEnd::Item) => segments.push(Segment::ListItemEnd),
            Event::Start(Tag::Strong) => {
                in_bold = true;
                bold.clear();
            }
            Event::End(TagEnd::Strong) => {
                if !bold.is_empty() {
                    segments.push(Segment::Bold(bold.clone()));
                }
                in_bold = false;
            }
            Event::Start(Tag::Emphasis) => {
                in_italic = true;
                italic.clear();
            }
            Event::End(TagEnd::Emphasis) => {
                if !italic.is_empty() {
                    segments.push(Segment::Italic(italic.clone()));
                }
                in_italic = false;
            }
            Event::Start(Tag::Strikethrough) => {
                in_strikethrough = true;
                strikethrough.clear();
            }
            Event::End(TagEnd::Strikethrough) => {
                if !strikethrough.is_empty() {
                    segments.push(Segment::Strikethrough(strikethrough.clone()));
                }
                in_strikethrough = false;
            }
            Event::Start(Tag::BlockQuote) => segments.push(Segment::BlockQuoteStart),
            Event::End(TagEnd::BlockQuote) => segments.push(Segment::BlockQuoteEnd),
            Event::Rule => segments.push(Segment::Rule),
            Event::Start(Tag::Link { dest_url, .. }) => {
                in_link = true;
                link_url = dest_url.to_string();
                link_text.clear();
            }
            Event::End(TagEnd::Link) => {
                segments.push(Segment::Link {
                    text: link_text.clone(),
                    url: link_url.clone(),
                });
                in_link = false;
            }
            _ => {}
        }
    }

    segments
}

/// Greedy word wrap using display widths, so CJK and emoji count correctly.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut result = Vec::new();
    let mut line = String::new();
    let mut line_width = 0usize;

    for word in text.split_whitespace() {
        let word_width = word.width();
        if line.is_empty() {
            line.push_str(word);
            line_width = word_width;
        } else if line_width + 1 + word_width <= width {
            line.push(' ');
            line.push_str(word);
            line_width += 1 + word_width;
        } else {
            result.push(line);
            line = word.to_string();
            line_width = word_width;
        }
    }
    if !line.is_empty() {
        result.push(line);
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

#[allow(clippy::too_many_lines)]
fn to_lines(segments: &[Segment], width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    fn flush(lines: &mut Vec<Line<'static>>, spans: &mut Vec<Span<'static>>) {
        if !spans.is_empty() {
            lines.push(Line::from(std::mem::take(spans)));
        }
    }

    let mut push_wrapped = |lines: &mut Vec<Line<'static>>,
                            spans: &mut Vec<Span<'static>>,
                            current_width: &mut usize,
                            text: &str,
                            style: Style| {
        // Wrapping collapses whitespace, so boundary spaces between inline
        // segments are re-added explicitly.
        if text.starts_with(char::is_whitespace) && *current_width > 0 {
            spans.push(Span::raw(" "));
            *current_width += 1;
        }
        for (i, piece) in wrap_text(text, width).into_iter().enumerate() {
            let piece_width = piece.width();
            if i > 0 || (*current_width > 0 && *current_width + piece_width > width) {
                flush(lines, spans);
                *current_width = 0;
            }
            *current_width += piece_width + 1;
            spans.push(Span::styled(piece, style));
            spans.push(Span::raw(" "));
        }
        if !text.ends_with(char::is_whitespace) {
            spans.pop();
            *current_width = current_width.saturating_sub(1);
        }
    };

    for segment in segments {
        match segment {
            Segment::Text(text) => {
                push_wrapped(
                    &mut lines,
                    &mut spans,
                    &mut current_width,
                    text,
                    Style::default().fg(theme.text),
                );
            }
            Segment::InlineCode(text) => {
                push_wrapped(
                    &mut lines,
                    &mut spans,
                    &mut current_width,
                    text,
                    Style::default().fg(theme.peach),
                );
            }
            Segment::Bold(text) => {
                push_wrapped(
                    &mut lines,
                    &mut spans,
                    &mut current_width,
                    text,
                    Style::default()
                        .fg(theme.text)
                        .add_modifier(Modifier::BOLD),
                );
            }
            Segment::Italic(text) => {
                push_wrapped(
                    &mut lines,
                    &mut spans,
                    &mut current_width,
                    text,
                    Style::default()
                        .fg(theme.text)
                        .add_modifier(Modifier::ITALIC),
                );
            }
            Segment::Strikethrough(text) => {
                push_wrapped(
                    &mut lines,
                    &mut spans,
                    &mut current_width,
                    text,
                    Style::default()
                        .fg(theme.subtext0)
                        .add_modifier(Modifier::CROSSED_OUT),
                );
            }
            Segment::Link { text, url } => {
                let display = if text.is_empty() || text == url {
                    url.clone()
                } else {
                    format!("{text} ({url})")
                };
                push_wrapped(
                    &mut lines,
                    &mut spans,
                    &mut current_width,
                    &display,
                    Style::default()
                        .fg(theme.blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            Segment::CodeBlock(code) => {
                flush(&mut lines, &mut spans);
                current_width = 0;
                for line in code.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {line}"),
                        Style::default().fg(theme.green),
                    )));
                }
                lines.push(Line::default());
            }
            Segment::SoftBreak => {
                spans.push(Span::raw(" "));
                current_width += 1;
            }
            Segment::HardBreak => {
                flush(&mut lines, &mut spans);
                current_width = 0;
            }
            Segment::ParagraphEnd => {
                flush(&mut lines, &mut spans);
                lines.push(Line::default());
                current_width = 0;
            }
            Segment::Heading { level, text } => {
                flush(&mut lines, &mut spans);
                current_width = 0;
                let color = match level {
                    1 => theme.mauve,
                    2 => theme.blue,
                    _ => theme.lavender,
                };
                lines.push(Line::from(Span::styled(
                    text.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::default());
            }
            Segment::ListItemStart {
                ordered,
                number,
                depth,
            } => {
                flush(&mut lines, &mut spans);
                let indent = "  ".repeat(depth.saturating_sub(1));
                let marker = if *ordered {
                    format!("{indent}{number}. ")
                } else {
                    format!("{indent}• ")
                };
                current_width = marker.width();
                spans.push(Span::styled(marker, Style::default().fg(theme.overlay0)));
            }
            Segment::ListItemEnd => {
                flush(&mut lines, &mut spans);
                current_width = 0;
            }
            Segment::BlockQuoteStart => {
                flush(&mut lines, &mut spans);
                spans.push(Span::styled(
                    "│ ".to_string(),
                    Style::default().fg(theme.overlay0),
                ));
                current_width = 2;
            }
            Segment::BlockQuoteEnd => {
                flush(&mut lines, &mut spans);
                lines.push(Line::default());
                current_width = 0;
            }
            Segment::Rule => {
                flush(&mut lines, &mut spans);
                lines.push(Line::from(Span::styled(
                    "─".repeat(width),
                    Style::default().fg(theme.overlay0),
                )));
                current_width = 0;
            }
        }
    }

    flush(&mut lines, &mut spans);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_headings_and_paragraphs() {
        let theme = Theme::mocha();
        let text = render("# Title\n\nSome body text.", 40, &theme).expect("renders");
        let out = plain(&text.lines);
        assert!(out.contains("Title"));
        assert!(out.contains("Some body text."));
    }

    #[test]
    fn code_blocks_keep_their_lines_verbatim() {
        let theme = Theme::mocha();
        let text = render("```\nfn main() {}\nlet x = 1;\n```", 40, &theme).expect("renders");
        let out = plain(&text.lines);
        assert!(out.contains("fn main() {}"));
        assert!(out.contains("let x = 1;"));
    }

    #[test]
    fn long_paragraphs_wrap_to_the_given_width() {
        let theme = Theme::mocha();
        let raw = "word ".repeat(40);
        let text = render(&raw, 20, &theme).expect("renders");
        assert!(text.lines.len() > 5);
        for line in &text.lines {
            assert!(line.width() <= 20, "line too wide: {}", line.width());
        }
    }

    #[test]
    fn list_items_get_markers() {
        let theme = Theme::mocha();
        let text = render("- first\n- second\n", 40, &theme).expect("renders");
        let out = plain(&text.lines);
        assert!(out.contains("• first"));
        assert!(out.contains("• second"));
    }

    #[test]
    fn ordered_lists_count_up() {
        let theme = Theme::mocha();
        let text = render("1. one\n2. two\n", 40, &theme).expect("renders");
        let out = plain(&text.lines);
        assert!(out.contains("1. one"));
        assert!(out.contains("2. two"));
    }

    #[test]
    fn inline_emphasis_keeps_word_spacing() {
        let theme = Theme::mocha();
        let text = render("fixed in **months** of work", 40, &theme).expect("renders");
        let out = plain(&text.lines);
        assert!(out.contains("fixed in months of work"), "got: {out}");
    }

    #[test]
    fn oversized_input_is_rejected() {
        let theme = Theme::mocha();
        let raw = "x".repeat(MAX_INPUT_BYTES + 1);
        assert!(render(&raw, 40, &theme).is_err());
    }
}
