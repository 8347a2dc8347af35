// ========================================
// HTMLレンダラ
// ========================================
//
// RenderNode をHTML文字列に変換する。body 向けポータルは
// 本体から切り離してドキュメント末尾に出力する。

use super::node::{Element, PortalTarget, RenderNode};

const VOID_TAGS: [&str; 6] = ["img", "br", "hr", "meta", "link", "input"];

pub struct HtmlRenderer {
    /// 本体のHTMLバッファ
    html_buffer: Vec<String>,
    /// body 直下に出すポータルのバッファ
    portal_buffer: Vec<String>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            html_buffer: Vec::new(),
            portal_buffer: Vec::new(),
        }
    }

    /// ツリーを描画してバッファに積む
    pub fn render(&mut self, node: &RenderNode) {
        let mut out = String::new();
        self.write_node(node, &mut out);
        self.html_buffer.push(out);
    }

    /// 本体部分のHTML（ポータルは含まない）
    pub fn body_html(&self) -> String {
        self.html_buffer.join("\n")
    }

    pub fn portal_html(&self) -> String {
        self.portal_buffer.join("\n")
    }

    /// ポータルをインラインで含めたHTML断片（プレビューペイン用）
    pub fn fragment_html(&self) -> String {
        if self.portal_buffer.is_empty() {
            self.body_html()
        } else {
            format!("{}\n{}", self.body_html(), self.portal_html())
        }
    }

    /// 完全なHTMLドキュメント
    pub fn document(&self, head: &str, lang: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="{}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
{}
</head>
<body>
{}
{}
</body>
</html>"#,
            escape_attr(lang),
            head,
            self.body_html(),
            self.portal_html()
        )
    }

    fn write_node(&mut self, node: &RenderNode, out: &mut String) {
        match node {
            RenderNode::Element(el) => self.write_element(el, out),
            RenderNode::Text(text) => out.push_str(&escape_text(text)),
            RenderNode::RawHtml(html) => out.push_str(html),
            RenderNode::Fragment(children) => {
                for child in children {
                    self.write_node(child, out);
                }
            }
            RenderNode::Portal { target, children } => match target {
                PortalTarget::Body => {
                    let mut portal = String::new();
                    for child in children {
                        self.write_node(child, &mut portal);
                    }
                    self.portal_buffer.push(portal);
                }
            },
            RenderNode::Empty => {}
        }
    }

    fn write_element(&mut self, el: &Element, out: &mut String) {
        out.push('<');
        out.push_str(&el.tag);
        for (name, value) in &el.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        out.push('>');
        if VOID_TAGS.contains(&el.tag.as_str()) {
            return;
        }
        for child in &el.children {
            self.write_node(child, out);
        }
        out.push_str("</");
        out.push_str(&el.tag);
        out.push('>');
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// ツリー1つをHTML断片に変換する（ポータルは末尾に連結）
pub fn render_to_string(node: &RenderNode) -> String {
    let mut renderer = HtmlRenderer::new();
    renderer.render(node);
    renderer.fragment_html()
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;").replace('\'', "&#39;")
}
