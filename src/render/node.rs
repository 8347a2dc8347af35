// ========================================
// 描画ツリー
// ========================================
//
// セクションレンダラーとレイアウト合成はこのツリーを生成し、
// HTML化（ネイティブ）やDOM反映（WASM）は別のレンダラーが担当する。

/// ポータルの描画先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalTarget {
    /// document.body 直下
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Element(Element),
    Text(String),
    /// エスケープ済みのHTML断片（Markdown変換結果など）
    RawHtml(String),
    Portal { target: PortalTarget, children: Vec<RenderNode> },
    Fragment(Vec<RenderNode>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<RenderNode>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_string(), value));
        }
    }

    pub fn class(self, class: &str) -> Self {
        let merged = match self.get_attr("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.attr("class", merged)
    }

    pub fn child(mut self, child: impl Into<RenderNode>) -> Self {
        let child = child.into();
        if !child.is_empty() {
            self.children.push(child);
        }
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RenderNode>,
    {
        for child in children {
            self = self.child(child);
        }
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(RenderNode::Text(text.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

impl From<Element> for RenderNode {
    fn from(element: Element) -> Self {
        RenderNode::Element(element)
    }
}

impl RenderNode {
    pub fn element(tag: &str) -> Element {
        Element::new(tag)
    }

    pub fn text(text: impl Into<String>) -> Self {
        RenderNode::Text(text.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RenderNode::Empty => true,
            RenderNode::Fragment(children) => children.iter().all(RenderNode::is_empty),
            _ => false,
        }
    }

    /// 深さ優先で要素を訪問（ポータルの中も含む）
    pub fn visit_elements<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        match self {
            RenderNode::Element(el) => {
                visit(el);
                for child in &el.children {
                    child.visit_elements(visit);
                }
            }
            RenderNode::Portal { children, .. } | RenderNode::Fragment(children) => {
                for child in children {
                    child.visit_elements(visit);
                }
            }
            RenderNode::Text(_) | RenderNode::RawHtml(_) | RenderNode::Empty => {}
        }
    }

    /// 指定クラスを持つ要素を列挙
    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.visit_elements(&mut |el| {
            if el.has_class(class) {
                found.push(el);
            }
        });
        found
    }

    /// 指定属性を持つ要素を列挙
    pub fn find_by_attr(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.visit_elements(&mut |el| {
            if el.get_attr(name).is_some() {
                found.push(el);
            }
        });
        found
    }

    pub fn portals(&self) -> Vec<&RenderNode> {
        let mut found = Vec::new();
        self.collect_portals(&mut found);
        found
    }

    fn collect_portals<'a>(&'a self, found: &mut Vec<&'a RenderNode>) {
        match self {
            RenderNode::Portal { .. } => found.push(self),
            RenderNode::Element(el) => el.children.iter().for_each(|c| c.collect_portals(found)),
            RenderNode::Fragment(children) => children.iter().for_each(|c| c.collect_portals(found)),
            _ => {}
        }
    }

    /// テキストノードを連結した内容（テスト・タブラベル確認用）
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            RenderNode::Text(t) => out.push_str(t),
            RenderNode::Element(el) => el.children.iter().for_each(|c| c.push_text(out)),
            RenderNode::Portal { children, .. } | RenderNode::Fragment(children) => {
                children.iter().for_each(|c| c.push_text(out))
            }
            RenderNode::RawHtml(_) | RenderNode::Empty => {}
        }
    }
}
