// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Rule-block parsing and same-element color pairing
//!
//! Stylesheets are segmented by a line-scanning state machine rather than a
//! CSS grammar: a line containing `{` opens a block, brace deltas of the
//! following lines are summed, and the block closes when the depth drops back
//! to zero or below. A line that closes a rule before opening the next one
//! is handled as its two halves. Each closed block is analyzed in isolation. There is no
//! cascade, specificity or inheritance.

pub mod variables;

pub use variables::VariableTable;

use crate::error::Result;
use crate::extract::LineIndex;
use regex::Regex;
use std::collections::VecDeque;
use std::iter::Enumerate;
use std::str::Lines;

/// Characters of each declaration line kept in a pair's context
const CONTEXT_LINE_CHARS: usize = 40;

/// One declaration line of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLine {
    /// 1-based
    pub number: usize,
    pub text: String,
}

/// A selector and the declaration lines bound to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationBlock {
    pub selector: String,
    pub lines: Vec<BlockLine>,
    pub start_line: usize,
}

/// A foreground/background pair declared in the same block, not yet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPair {
    pub selector: String,
    pub foreground: String,
    pub background: String,
    /// Line of the foreground declaration
    pub line: usize,
    pub context: String,
}

/// Iterator over the declaration blocks of one stylesheet
pub struct RuleBlocks<'a> {
    lines: Enumerate<Lines<'a>>,
    open: Option<(DeclarationBlock, i64)>,
    pending_selector: Option<&'a str>,
    ready: VecDeque<DeclarationBlock>,
}

impl<'a> RuleBlocks<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            open: None,
            pending_selector: None,
            ready: VecDeque::new(),
        }
    }

    fn feed(&mut self, number: usize, line: &'a str) {
        let trimmed = line.trim();
        let delta = brace_delta(line);

        if line.contains('{') && !trimmed.starts_with("/*") {
            // `} .b {` or `.a { ... } .b {`: close first, then open from the tail
            if let Some(open_at) = line.rfind('{') {
                if let Some(close_at) = line[..open_at].rfind('}') {
                    let (closing, opening) = line.split_at(close_at + 1);
                    self.feed(number, closing);
                    self.feed(number, opening);
                    return;
                }
            }

            if let Some((block, _)) = self.open.take() {
                self.ready.push_back(block);
            }

            let head = line.split('{').next().unwrap_or("");
            let head = head.trim().trim_start_matches('}').trim();
            let selector = if head.is_empty() {
                self.pending_selector.unwrap_or("").trim().to_string()
            } else {
                head.to_string()
            };
            self.pending_selector = None;

            let block = DeclarationBlock {
                selector,
                lines: vec![BlockLine {
                    number,
                    text: line.to_string(),
                }],
                start_line: number,
            };
            if delta <= 0 {
                self.ready.push_back(block);
            } else {
                self.open = Some((block, delta));
            }
            return;
        }

        match self.open.as_mut() {
            Some((block, depth)) => {
                block.lines.push(BlockLine {
                    number,
                    text: line.to_string(),
                });
                *depth += delta;
                if *depth <= 0 {
                    if let Some((block, _)) = self.open.take() {
                        self.ready.push_back(block);
                    }
                }
            }
            None => {
                if !trimmed.is_empty() && !trimmed.starts_with('}') {
                    self.pending_selector = Some(trimmed);
                }
            }
        }
    }
}

impl<'a> Iterator for RuleBlocks<'a> {
    type Item = DeclarationBlock;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(block) = self.ready.pop_front() {
                return Some(block);
            }
            match self.lines.next() {
                Some((index, line)) => self.feed(index + 1, line),
                // Unbalanced braces: whatever is still open closes at end of input
                None => return self.open.take().map(|(block, _)| block),
            }
        }
    }
}

fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// Compiled declaration patterns used for block analysis
#[derive(Debug)]
pub struct BlockAnalyzer {
    text_color: Regex,
    background: Regex,
    content: Regex,
    inline_style: Regex,
}

/// Value forms accepted on either side of a pair
const VALUE: &str = r"(var\((?:[^()]|\([^()]*\))*\)|#[0-9a-fA-F]{3,8}\b|rgba?\([^)]*\)|hsla?\([^)]*\)|[a-zA-Z]+)";

impl BlockAnalyzer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            text_color: Regex::new(&format!(r"(?i)(?:^|[^-\w])color\s*:\s*{}", VALUE))?,
            background: Regex::new(&format!(
                r#"(?i)(?:^|[\s;{{"'])background(?:-color)?\s*:\s*{}"#,
                VALUE
            ))?,
            content: Regex::new(r"(?i)(?:^|[^-\w])content\s*:")?,
            inline_style: Regex::new(
                r#"<([a-zA-Z][\w-]*)\b[^>]*?\sstyle\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
            )?,
        })
    }

    /// Rule blocks of a stylesheet
    pub fn blocks<'a>(&self, text: &'a str) -> RuleBlocks<'a> {
        RuleBlocks::new(text)
    }

    /// `style="..."` and `style='...'` attributes as blocks with selector
    /// `<tag style>`.
    ///
    /// Each declaration becomes its own `;`-terminated line.
    pub fn inline_style_blocks(&self, text: &str) -> Vec<DeclarationBlock> {
        let lines = LineIndex::new(text);
        self.inline_style
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let number = lines.line_of(whole.start());
                let body = caps.get(2).or_else(|| caps.get(3))?;
                let declarations: Vec<BlockLine> = body
                    .as_str()
                    .split(';')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(|d| BlockLine {
                        number,
                        text: format!("{};", d),
                    })
                    .collect();
                (!declarations.is_empty()).then(|| DeclarationBlock {
                    selector: format!("<{} style>", caps[1].to_ascii_lowercase()),
                    lines: declarations,
                    start_line: number,
                })
            })
            .collect()
    }

    /// Foreground/background pairs declared in one block.
    ///
    /// `::before`/`::after` blocks without `content` are decorative and skipped.
    /// `transparent` never pairs, and a pair whose two raw values are identical
    /// is dropped.
    pub fn pairs(&self, block: &DeclarationBlock) -> Vec<ColorPair> {
        let selector = block.selector.as_str();
        if (selector.contains("::before") || selector.contains("::after"))
            && !block.lines.iter().any(|l| self.content.is_match(&l.text))
        {
            return Vec::new();
        }

        let mut foregrounds = Vec::new();
        let mut backgrounds = Vec::new();
        for line in &block.lines {
            foregrounds.extend(
                declared_values(&self.text_color, &line.text).map(|value| (value, line)),
            );
            backgrounds.extend(
                declared_values(&self.background, &line.text).map(|value| (value, line)),
            );
        }

        let mut pairs = Vec::new();
        for (fg, fg_line) in &foregrounds {
            for (bg, bg_line) in &backgrounds {
                if fg == bg {
                    continue;
                }
                pairs.push(ColorPair {
                    selector: if selector.is_empty() {
                        "unknown".to_string()
                    } else {
                        selector.to_string()
                    },
                    foreground: fg.to_string(),
                    background: bg.to_string(),
                    line: fg_line.number,
                    context: pair_context(&fg_line.text, &bg_line.text),
                });
            }
        }
        pairs
    }
}

/// Values of one property on a line, each followed by `;` or `!`
fn declared_values<'t>(re: &'t Regex, line: &'t str) -> impl Iterator<Item = &'t str> + 't {
    re.captures_iter(line).filter_map(move |caps| {
        let value = caps.get(1)?;
        let rest = line[value.end()..].trim_start();
        if !(rest.starts_with(';') || rest.starts_with('!')) {
            return None;
        }
        let value = value.as_str().trim();
        (!value.eq_ignore_ascii_case("transparent")).then_some(value)
    })
}

fn pair_context(fg_line: &str, bg_line: &str) -> String {
    let head = |s: &str, n: usize| s.trim().chars().take(n).collect::<String>();
    if fg_line == bg_line {
        head(fg_line, CONTEXT_LINE_CHARS * 2)
    } else {
        format!(
            "{}...{}",
            head(fg_line, CONTEXT_LINE_CHARS),
            head(bg_line, CONTEXT_LINE_CHARS)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> BlockAnalyzer {
        BlockAnalyzer::new().unwrap()
    }

    fn all_pairs(css: &str) -> Vec<ColorPair> {
        let a = analyzer();
        a.blocks(css).flat_map(|b| a.pairs(&b)).collect()
    }

    #[test]
    fn test_blocks_multi_line() {
        let css = ".a {\n  color: #000;\n}\n\n.b\n{\n  background: #fff;\n}\n";
        let blocks: Vec<_> = RuleBlocks::new(css).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].selector, ".a");
        assert_eq!(blocks[0].start_line, 1);
        assert_eq!(blocks[0].lines.len(), 3);
        assert_eq!(blocks[1].selector, ".b");
        assert_eq!(blocks[1].start_line, 6);
    }

    #[test]
    fn test_single_line_block_closes_immediately() {
        let blocks: Vec<_> = RuleBlocks::new(".x { color: #000; }\n.y { color: #fff; }").collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].selector, ".y");
    }

    #[test]
    fn test_unbalanced_block_closed_at_end() {
        let blocks: Vec<_> = RuleBlocks::new(".a {\n  color: #000;\n  background: #fff;").collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 3);
    }

    #[test]
    fn test_nested_open_flushes_previous() {
        let css = "@media (min-width: 40rem) {\n  .a {\n    color: #000;\n  }\n}\n";
        let blocks: Vec<_> = RuleBlocks::new(css).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].selector, "@media (min-width: 40rem)");
        assert_eq!(blocks[1].selector, ".a");
        assert_eq!(blocks[1].lines.len(), 3);
    }

    #[test]
    fn test_close_and_reopen_on_one_line() {
        let css = ".a {\n  color: #000;\n} .b {\n  background: #fff;\n  color: #333;\n}\n";
        let blocks: Vec<_> = RuleBlocks::new(css).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].selector, ".a");
        assert_eq!(blocks[1].selector, ".b");
        assert_eq!(blocks[1].start_line, 3);
        assert_eq!(blocks[1].lines.len(), 4);

        let pairs = all_pairs(css);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].selector, ".b");
        assert_eq!(pairs[0].foreground, "#333");
    }

    #[test]
    fn test_single_line_block_then_open() {
        let css = ".a { color: #111; } .b {\n  color: #000;\n  background: #fff;\n}\n";
        let blocks: Vec<_> = RuleBlocks::new(css).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].selector, ".a");
        assert_eq!(blocks[0].lines.len(), 1);
        assert_eq!(blocks[1].selector, ".b");

        let pairs = all_pairs(css);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].selector, ".b");
        assert_eq!(pairs[0].foreground, "#000");
    }

    #[test]
    fn test_two_rules_on_one_line_stay_apart() {
        let pairs = all_pairs(".a { color: #000; } .b { background: #fff; }");
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_comment_line_does_not_open() {
        let blocks: Vec<_> = RuleBlocks::new("/* .fake { */\n.real {\n}\n").collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].selector, ".real");
    }

    #[test]
    fn test_single_pair() {
        let pairs = all_pairs(".x { color: #000; background: #fff; }");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].foreground, "#000");
        assert_eq!(pairs[0].background, "#fff");
        assert_eq!(pairs[0].selector, ".x");
    }

    #[test]
    fn test_cross_product() {
        let css = ".x {\n  color: #111;\n  color: var(--fg);\n  background-color: #fafafa !important;\n}";
        let pairs = all_pairs(css);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].foreground, "var(--fg)");
        assert_eq!(pairs[0].line, 2);
        assert_eq!(pairs[0].context, "color: #111;...background-color: #fafafa !important;");
    }

    #[test]
    fn test_border_color_is_not_text_color() {
        let pairs = all_pairs(".x {\n  border-color: #000;\n  background: #fff;\n}");
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_transparent_and_identical_skipped() {
        assert!(all_pairs(".x { color: #fff; background: transparent; }").is_empty());
        assert!(all_pairs(".x { color: #fff; background: #fff; }").is_empty());
    }

    #[test]
    fn test_value_needs_terminator() {
        assert!(all_pairs(".x { color: #000; background: #fff url(a.png); }").is_empty());
    }

    #[test]
    fn test_pseudo_element_needs_content() {
        let decorative = ".x::before {\n  color: #000;\n  background: #fff;\n}";
        assert!(all_pairs(decorative).is_empty());
        let with_text = ".x::after {\n  content: 'New';\n  color: #000;\n  background: #fff;\n}";
        assert_eq!(all_pairs(with_text).len(), 1);
    }

    #[test]
    fn test_inline_style_blocks() {
        let a = analyzer();
        let html = "<body>\n<span class=\"tag\" style=\"color: #777; background-color: white\">x</span>";
        let blocks = a.inline_style_blocks(html);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].selector, "<span style>");
        assert_eq!(blocks[0].start_line, 2);
        let pairs = a.pairs(&blocks[0]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].background, "white");
    }

    #[test]
    fn test_single_quoted_inline_style() {
        let a = analyzer();
        let blocks = a.inline_style_blocks("<p style='color: #777; background: #fff'>x</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].selector, "<p style>");
        let pairs = a.pairs(&blocks[0]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].foreground, "#777");
        assert_eq!(pairs[0].background, "#fff");
    }
}
