//! Selection widget.
//!
//! A group of labeled buttons that behaves either as a radio group
//! ([`SelectionMode::Single`]) or as a set of toggles ([`SelectionMode::Multi`]).
//! The widget owns its state and exposes it only through accessors, so the
//! single-mode invariant (exactly one selected index) cannot be broken from
//! outside.
//!
//! Rendering produces [`Button`] descriptors instead of touching any DOM; the
//! page templates turn them into markup.
//!
//! ```text
//! SelectionWidget::new("msSortBy", options)?
//!     .on_change(|event| ...)
//!     .initialize()          // renders buttons, fires on_load once
//!     .toggle(2)?            // user click, fires on_change
//! ```

use std::{collections::BTreeSet, fmt, sync::Arc};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("operation is not valid in {0} mode")]
    InvalidMode(SelectionMode),
    #[error("index {0} is out of range")]
    OutOfRange(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multi,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Single => write!(f, "single-select"),
            SelectionMode::Multi => write!(f, "multi-select"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonClasses {
    pub default: String,
    pub selected: String,
}

impl Default for ButtonClasses {
    fn default() -> Self {
        Self {
            default: "btn-primary".to_string(),
            selected: "btn-selected".to_string(),
        }
    }
}

/// Construction options. Unset fields keep the [`Default`] values.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub mode: SelectionMode,
    pub items: Vec<SelectOption>,
    /// Initial selection in single mode.
    pub selected_index: usize,
    /// Initial selection in multi mode.
    pub selected_indices: Vec<usize>,
    pub classes: ButtonClasses,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Multi,
            items: Vec::new(),
            selected_index: 0,
            selected_indices: vec![0],
            classes: ButtonClasses::default(),
        }
    }
}

/// A rendered button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub id: String,
    pub index: usize,
    pub label: String,
    pub selected: bool,
}

/// Payload handed to change and load listeners.
#[derive(Debug)]
pub struct SelectionEvent<'a> {
    pub container: &'a str,
    pub items: &'a [SelectOption],
    pub buttons: &'a [Button],
    pub selected_index: usize,
    pub selected_indices: &'a BTreeSet<usize>,
}

type Listener = Arc<dyn Fn(&SelectionEvent<'_>) + Send + Sync>;

#[derive(Clone)]
pub struct SelectionWidget {
    container: String,
    mode: SelectionMode,
    items: Vec<SelectOption>,
    selected_index: usize,
    selected_indices: BTreeSet<usize>,
    classes: ButtonClasses,
    buttons: Vec<Button>,
    loaded: bool,
    on_change: Vec<Listener>,
    on_load: Vec<Listener>,
}

impl fmt::Debug for SelectionWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionWidget")
            .field("container", &self.container)
            .field("mode", &self.mode)
            .field("items", &self.items)
            .field("selected_index", &self.selected_index)
            .field("selected_indices", &self.selected_indices)
            .field("buttons", &self.buttons.len())
            .finish_non_exhaustive()
    }
}

impl SelectionWidget {
    /// Creates a widget bound to `container`.
    ///
    /// # Errors
    ///
    /// In single mode the initial `selected_index` must point at an item,
    /// otherwise [`WidgetError::OutOfRange`] is returned. Multi-mode initial
    /// indices that do not point at an item are dropped.
    pub fn new(container: impl Into<String>, options: WidgetOptions) -> Result<Self, WidgetError> {
        let WidgetOptions {
            mode,
            items,
            selected_index,
            selected_indices,
            classes,
        } = options;

        if mode == SelectionMode::Single && selected_index >= items.len() {
            return Err(WidgetError::OutOfRange(selected_index));
        }

        let selected_indices = match mode {
            SelectionMode::Multi => selected_indices
                .into_iter()
                .filter(|&i| i < items.len())
                .collect(),
            SelectionMode::Single => BTreeSet::new(),
        };

        Ok(Self {
            container: container.into(),
            mode,
            items,
            selected_index,
            selected_indices,
            classes,
            buttons: Vec::new(),
            loaded: false,
            on_change: Vec::new(),
            on_load: Vec::new(),
        })
    }

    /// Registers a listener fired after every [`toggle`](Self::toggle).
    pub fn on_change<F>(mut self, listener: F) -> Self
    where
        F: Fn(&SelectionEvent<'_>) + Send + Sync + 'static,
    {
        self.on_change.push(Arc::new(listener));
        self
    }

    /// Registers a listener fired once, after the first render.
    pub fn on_load<F>(mut self, listener: F) -> Self
    where
        F: Fn(&SelectionEvent<'_>) + Send + Sync + 'static,
    {
        self.on_load.push(Arc::new(listener));
        self
    }

    /// Renders one button per item and applies the current selection.
    pub fn initialize(&mut self) -> &mut Self {
        self.buttons = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| Button {
                id: format!("btn{index}_{}", item.label),
                index,
                label: item.label.clone(),
                selected: false,
            })
            .collect();
        self.sync_buttons();

        if !self.loaded {
            self.loaded = true;
            self.dispatch(&self.on_load);
        }
        self
    }

    /// Handles a click on the button at `index`.
    ///
    /// # Errors
    ///
    /// [`WidgetError::OutOfRange`] if `index` does not point at an item.
    pub fn toggle(&mut self, index: usize) -> Result<(), WidgetError> {
        if index >= self.items.len() {
            return Err(WidgetError::OutOfRange(index));
        }

        match self.mode {
            SelectionMode::Single => self.selected_index = index,
            SelectionMode::Multi => {
                if !self.selected_indices.remove(&index) {
                    self.selected_indices.insert(index);
                }
            }
        }
        self.sync_buttons();
        self.dispatch(&self.on_change);
        Ok(())
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn items(&self) -> &[SelectOption] {
        &self.items
    }

    /// Replaces the option list. Buttons are rebuilt on the next
    /// [`initialize`](Self::initialize).
    ///
    /// # Errors
    ///
    /// [`WidgetError::OutOfRange`] when a single-mode widget would be left
    /// without any item to select.
    pub fn set_items(&mut self, items: Vec<SelectOption>) -> Result<(), WidgetError> {
        match self.mode {
            SelectionMode::Single => {
                if items.is_empty() {
                    return Err(WidgetError::OutOfRange(self.selected_index));
                }
                if self.selected_index >= items.len() {
                    self.selected_index = 0;
                }
            }
            SelectionMode::Multi => self.selected_indices.retain(|&i| i < items.len()),
        }
        self.items = items;
        Ok(())
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// # Errors
    ///
    /// [`WidgetError::InvalidMode`] in multi mode, [`WidgetError::OutOfRange`]
    /// if `index` does not point at an item.
    pub fn set_selected_index(&mut self, index: usize) -> Result<(), WidgetError> {
        if self.mode == SelectionMode::Multi {
            return Err(WidgetError::InvalidMode(self.mode));
        }
        if index >= self.items.len() {
            return Err(WidgetError::OutOfRange(index));
        }
        self.selected_index = index;
        self.sync_buttons();
        Ok(())
    }

    pub fn selected_indices(&self) -> &BTreeSet<usize> {
        &self.selected_indices
    }

    /// # Errors
    ///
    /// [`WidgetError::InvalidMode`] in single mode, [`WidgetError::OutOfRange`]
    /// for the first index that does not point at an item.
    pub fn set_selected_indices<I>(&mut self, indices: I) -> Result<(), WidgetError>
    where
        I: IntoIterator<Item = usize>,
    {
        if self.mode == SelectionMode::Single {
            return Err(WidgetError::InvalidMode(self.mode));
        }
        let indices: BTreeSet<usize> = indices.into_iter().collect();
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.items.len()) {
            return Err(WidgetError::OutOfRange(bad));
        }
        self.selected_indices = indices;
        self.sync_buttons();
        Ok(())
    }

    pub fn is_selected(&self, index: usize) -> bool {
        match self.mode {
            SelectionMode::Single => self.selected_index == index,
            SelectionMode::Multi => self.selected_indices.contains(&index),
        }
    }

    /// The selected item in single mode.
    pub fn selected_item(&self) -> Option<&SelectOption> {
        match self.mode {
            SelectionMode::Single => self.items.get(self.selected_index),
            SelectionMode::Multi => None,
        }
    }

    /// Selected items in item order.
    pub fn selected_items(&self) -> Vec<&SelectOption> {
        self.items
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_selected(*i))
            .map(|(_, item)| item)
            .collect()
    }

    /// CSS classes of a rendered button.
    pub fn button_class(&self, button: &Button) -> String {
        if button.selected {
            format!("{} {}", self.classes.default, self.classes.selected)
        } else {
            self.classes.default.clone()
        }
    }

    fn sync_buttons(&mut self) {
        for i in 0..self.buttons.len() {
            let selected = self.is_selected(self.buttons[i].index);
            self.buttons[i].selected = selected;
        }
    }

    fn dispatch(&self, listeners: &[Listener]) {
        let event = SelectionEvent {
            container: &self.container,
            items: &self.items,
            buttons: &self.buttons,
            selected_index: self.selected_index,
            selected_indices: &self.selected_indices,
        };
        for listener in listeners {
            listener(&event);
        }
    }
}
