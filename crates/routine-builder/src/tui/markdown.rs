// Markdown rendering for assistant replies.
//
// Replies are parsed with pulldown-cmark and the event stream is folded into
// styled ratatui lines: headings, strong/emphasis/strikethrough spans, inline
// code, bullet and numbered lists (nested lists indent further), fenced code
// blocks and rules. Prose blocks are separated by a single blank line.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Convert reply text into styled lines.
pub fn reply_lines(text: &str) -> Vec<Line<'static>> {
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        renderer.handle(event);
    }
    renderer.finish()
}

fn code_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn heading_style(level: HeadingLevel) -> Style {
    if level == HeadingLevel::H1 {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    /// Inline styles in effect, innermost last.
    styles: Vec<Style>,
    /// One entry per open list: the next item number, or `None` for bullets.
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    last_block_was_prose: bool,
}

impl Renderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let style = self.style().patch(code_style());
                self.current.push(Span::styled(code.into_string(), style));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                self.start_block(false);
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(24),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // Paragraphs inside list items continue the item line.
                if self.lists.is_empty() {
                    self.start_block(true);
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block(false);
                self.styles.push(heading_style(level));
            }
            Tag::CodeBlock(_) => {
                self.start_block(true);
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block(false);
                } else {
                    self.flush();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len());
                match self.lists.last_mut() {
                    Some(Some(number)) => {
                        self.current.push(Span::styled(
                            format!("{indent}{number}. "),
                            Style::default().fg(Color::Yellow),
                        ));
                        *number += 1;
                    }
                    _ => self.current.push(Span::raw(format!("{indent}• "))),
                }
            }
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Item => self.flush(),
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.flush();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.flush();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.lines
                    .push(Line::from(Span::styled(format!("    {line}"), code_style())));
            }
            return;
        }
        let style = self.style();
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn push_style(&mut self, style: Style) {
        self.styles.push(style);
    }

    fn style(&self) -> Style {
        self.styles
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    /// Begin a top-level block. A blank line separates it from earlier output
    /// when either side is prose; headings and lists stack tightly.
    fn start_block(&mut self, prose: bool) {
        self.flush();
        if (prose || self.last_block_was_prose) && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.last_block_was_prose = prose;
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        self.lines
    }
}
