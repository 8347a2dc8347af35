/// 選択中タブのローカルUI状態（"tab-{index}" 形式、永続化しない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabState {
    value: String,
}

impl Default for TabState {
    fn default() -> Self {
        Self::new()
    }
}

impl TabState {
    pub fn new() -> Self {
        Self {
            value: tab_value(0),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn select(&mut self, index: usize) {
        self.value = tab_value(index);
    }

    /// 値を直接設定（クリックイベントの data-tab などから）
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    /// 選択中のインデックス。解釈できない値や範囲外は先頭に戻す。
    pub fn selected_index(&self, tab_count: usize) -> usize {
        self.value
            .strip_prefix("tab-")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|i| *i < tab_count)
            .unwrap_or(0)
    }
}

pub fn tab_value(index: usize) -> String {
    format!("tab-{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selects_first_tab() {
        let state = TabState::default();
        assert_eq!(state.value(), "tab-0");
        assert_eq!(state.selected_index(3), 0);
    }

    #[test]
    fn test_out_of_range_and_garbage_fall_back() {
        let mut state = TabState::new();
        state.select(5);
        assert_eq!(state.selected_index(6), 5);
        assert_eq!(state.selected_index(2), 0);
        state.set_value("panel-1");
        assert_eq!(state.selected_index(2), 0);
    }
}
