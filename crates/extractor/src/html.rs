//! HTML to simplified markdown.
//!
//! A tolerant, single-pass tag scanner rather than a full HTML parser: it only
//! needs to keep the readable body and drop page chrome.
//!
//! - Regions inside `nav`, `header`, `footer`, `aside`, scripts, forms and any
//!   element whose `class`/`id` mentions a sidebar are dropped entirely.
//! - Links to another host keep their anchor text only; same-site links are
//!   rendered as `[text](absolute-url)`.
//! - Headings, list items, emphasis and `pre` blocks map to markdown.

use url::Url;

const EXCLUDED_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", "template", "svg", "form",
    "iframe", "button", "select", "canvas",
];

/// Landmark roles that mark page chrome
const EXCLUDED_ROLES: &[&str] = &["navigation", "banner", "contentinfo", "complementary"];

/// Elements whose body is not markup
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template", "textarea"];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Convert an HTML document or fragment to markdown-flavoured text.
///
/// `base` is the page URL; it decides which links are external and resolves
/// relative hrefs. Without it, only relative links are kept.
pub fn html_to_markdown(html: &str, base: Option<&Url>) -> String {
    let mut converter = Converter::new(base);
    converter.run(html);
    converter.finish()
}

/// Text of the document's `<title>` element, if any.
pub fn extract_title(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let body_start = open + lower[open..].find('>')? + 1;
    let body_end = body_start + lower[body_start..].find("</title")?;

    let title = collapse_whitespace(&decode_entities(&html[body_start..body_end]));
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

#[derive(Debug)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    attrs: Vec<(String, String)>,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.name.as_str())
    }
}

struct PendingLink {
    href: Option<String>,
    start: usize,
}

struct Converter<'a> {
    base: Option<&'a Url>,
    out: String,
    skip_tag: String,
    skip_depth: usize,
    in_pre: bool,
    links: Vec<PendingLink>,
}

impl<'a> Converter<'a> {
    fn new(base: Option<&'a Url>) -> Self {
        Self {
            base,
            out: String::new(),
            skip_tag: String::new(),
            skip_depth: 0,
            in_pre: false,
            links: Vec::new(),
        }
    }

    fn run(&mut self, html: &str) {
        let mut rest = html;

        while !rest.is_empty() {
            let Some(pos) = rest.find('<') else {
                self.text(rest);
                break;
            };

            self.text(&rest[..pos]);
            rest = &rest[pos..];

            if rest.starts_with("<!--") {
                rest = match rest.find("-->") {
                    Some(end) => &rest[end + 3..],
                    None => "",
                };
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                rest = match rest.find('>') {
                    Some(end) => &rest[end + 1..],
                    None => "",
                };
                continue;
            }

            let starts_tag = rest[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '/');
            if !starts_tag {
                self.text("<");
                rest = &rest[1..];
                continue;
            }

            let Some(end) = find_tag_end(rest) else {
                break;
            };
            let tag = parse_tag(&rest[1..end]);
            rest = &rest[end + 1..];

            if !tag.closing && !tag.self_closing && RAW_TEXT_TAGS.contains(&tag.name.as_str()) {
                rest = skip_raw_text(rest, &tag.name);
                continue;
            }

            self.handle_tag(tag);
        }
    }

    fn handle_tag(&mut self, tag: Tag) {
        if self.skip_depth > 0 {
            if tag.name == self.skip_tag && !tag.is_void() {
                if tag.closing {
                    self.skip_depth -= 1;
                } else if !tag.self_closing {
                    self.skip_depth += 1;
                }
            }
            return;
        }

        if !tag.closing && !tag.self_closing && !tag.is_void() && is_excluded(&tag) {
            self.skip_tag = tag.name.clone();
            self.skip_depth = 1;
            return;
        }

        if tag.closing {
            self.close(&tag.name);
        } else {
            self.open(&tag);
            if tag.self_closing && !tag.is_void() {
                self.close(&tag.name);
            }
        }
    }

    fn open(&mut self, tag: &Tag) {
        match tag.name.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = heading_level(&tag.name);
                self.blank_line();
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
            }
            "p" | "table" | "ul" | "ol" | "dl" | "blockquote" => self.blank_line(),
            "div" | "section" | "article" | "main" | "tr" | "dt" | "dd" | "figure" => {
                self.newline()
            }
            "li" => {
                self.newline();
                self.out.push_str("- ");
            }
            "br" => self.out.push('\n'),
            "hr" => {
                self.blank_line();
                self.out.push_str("---");
                self.blank_line();
            }
            "strong" | "b" => self.out.push_str("**"),
            "em" | "i" => self.out.push('_'),
            "code" if !self.in_pre => self.out.push('`'),
            "pre" => {
                self.blank_line();
                self.out.push_str("```\n");
                self.in_pre = true;
            }
            "td" | "th" => self.out.push(' '),
            "a" => {
                let href = tag.attr("href").and_then(|href| self.internal_href(href));
                self.links.push(PendingLink {
                    href,
                    start: self.out.len(),
                });
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.blank_line(),
            "p" | "table" | "ul" | "ol" | "dl" | "blockquote" => self.blank_line(),
            "div" | "section" | "article" | "main" | "tr" | "dt" | "dd" | "figure" | "li" => {
                self.newline()
            }
            "strong" | "b" => self.out.push_str("**"),
            "em" | "i" => self.out.push('_'),
            "code" if !self.in_pre => self.out.push('`'),
            "pre" => {
                self.newline();
                self.out.push_str("```");
                self.blank_line();
                self.in_pre = false;
            }
            "a" => self.finish_link(),
            _ => {}
        }
    }

    fn finish_link(&mut self) {
        let Some(link) = self.links.pop() else {
            return;
        };
        let Some(href) = link.href else {
            return;
        };
        if link.start > self.out.len() {
            return;
        }

        let text = self.out[link.start..].trim().to_string();
        if text.is_empty() {
            return;
        }

        self.out.truncate(link.start);
        self.out.push_str(&format!("[{}]({})", text, href));
    }

    /// Absolute URL for a same-site link, `None` for external or non-http links.
    fn internal_href(&self, href: &str) -> Option<String> {
        let href = href.trim();
        let lower = href.to_ascii_lowercase();
        if href.is_empty()
            || href.starts_with('#')
            || lower.starts_with("javascript:")
            || lower.starts_with("mailto:")
            || lower.starts_with("tel:")
        {
            return None;
        }

        match self.base {
            Some(base) => {
                let resolved = base.join(href).ok()?;
                let same_host = resolved.host_str() == base.host_str();
                let web = matches!(resolved.scheme(), "http" | "https");
                (same_host && web).then(|| resolved.to_string())
            }
            None => Url::parse(href).is_err().then(|| href.to_string()),
        }
    }

    fn text(&mut self, raw: &str) {
        if self.skip_depth > 0 || raw.is_empty() {
            return;
        }

        let decoded = decode_entities(raw);
        if self.in_pre {
            self.out.push_str(&decoded);
            return;
        }

        let collapsed = collapse_whitespace(&decoded);
        let at_line_start = self.out.is_empty() || self.out.ends_with(char::is_whitespace);
        let collapsed = if at_line_start {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        self.out.push_str(collapsed);
    }

    fn newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn blank_line(&mut self) {
        if self.out.is_empty() {
            return;
        }
        self.newline();
        if !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        let mut result = String::with_capacity(self.out.len());
        let mut blank_run = 0;

        for line in self.out.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            result.push_str(line);
            result.push('\n');
        }

        result.trim().to_string()
    }
}

fn is_excluded(tag: &Tag) -> bool {
    if EXCLUDED_TAGS.contains(&tag.name.as_str()) {
        return true;
    }

    let mentions_sidebar = ["class", "id"].iter().any(|attr| {
        tag.attr(attr)
            .is_some_and(|v| v.to_ascii_lowercase().contains("sidebar"))
    });

    let chrome_role = tag
        .attr("role")
        .is_some_and(|role| EXCLUDED_ROLES.contains(&role.to_ascii_lowercase().as_str()));

    mentions_sidebar || chrome_role
}

fn heading_level(name: &str) -> usize {
    name[1..].parse().unwrap_or(1)
}

/// Index of the `>` closing the tag that starts at `s[0] == '<'`, honoring quotes.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i),
            None => {}
        }
    }
    None
}

fn parse_tag(inner: &str) -> Tag {
    let inner = inner.trim();
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, inner),
    };
    let (self_closing, inner) = match inner.strip_suffix('/') {
        Some(rest) => (true, rest.trim_end()),
        None => (false, inner),
    };

    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();
    let attrs = parse_attrs(&inner[name_end..]);

    Tag {
        name,
        closing,
        self_closing,
        attrs,
    }
}

fn parse_attrs(mut s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();

    loop {
        s = s.trim_start();
        if s.is_empty() {
            break;
        }

        let key_end = s
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(s.len());
        let key = s[..key_end].to_ascii_lowercase();
        s = s[key_end..].trim_start();

        let value = if let Some(rest) = s.strip_prefix('=') {
            let rest = rest.trim_start();
            match rest.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &rest[1..];
                    let end = body.find(q).unwrap_or(body.len());
                    s = body.get(end + 1..).unwrap_or("");
                    &body[..end]
                }
                _ => {
                    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                    s = &rest[end..];
                    &rest[..end]
                }
            }
        } else {
            ""
        };

        if key.is_empty() {
            // Stray '=' or garbage; drop one char and carry on
            s = s.get(1..).unwrap_or("");
            continue;
        }

        attrs.push((key, decode_entities(value)));
    }

    attrs
}

/// Skip past `</name ...>`, case-insensitively. Unterminated bodies eat the rest.
fn skip_raw_text<'s>(rest: &'s str, name: &str) -> &'s str {
    let closing = format!("</{}", name);
    match rest.to_ascii_lowercase().find(&closing) {
        Some(pos) => {
            let after = &rest[pos..];
            match after.find('>') {
                Some(end) => &after[end + 1..],
                None => "",
            }
        }
        None => "",
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let hex = num.strip_prefix('x').or_else(|| num.strip_prefix('X'));
        let code = match hex {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }

    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        _ => return None,
    };
    Some(c)
}
