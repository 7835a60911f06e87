use serde::Deserialize;
use tracing::debug;
use url::form_urlencoded;

use super::{COLLAGE_SIZES, CollageConfig, SortKey, TimeRange};
use crate::widget::{
    SelectOption, SelectionEvent, SelectionMode, SelectionWidget, WidgetError, WidgetOptions,
};

/// Query string of the collage builder page.
///
/// Every field is kept as text so malformed values reach
/// [`CollageSettings::from_query`] and fall back to the first option instead
/// of failing extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsQuery {
    pub size: Option<String>,
    pub time_range: Option<String>,
    pub sort_by: Option<String>,
    pub unique: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Size,
    SortBy,
    TimeRange,
    Options,
}

impl SettingKind {
    pub const ALL: [SettingKind; 4] = [
        SettingKind::Size,
        SettingKind::SortBy,
        SettingKind::TimeRange,
        SettingKind::Options,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SettingKind::Size => "Collage Size",
            SettingKind::SortBy => "Sort By",
            SettingKind::TimeRange => "Time Range",
            SettingKind::Options => "Options",
        }
    }
}

const UNIQUE_OPTION: &str = "unique";

/// The four selection widgets of the collage builder.
#[derive(Debug, Clone)]
pub struct CollageSettings {
    size: SelectionWidget,
    sort_by: SelectionWidget,
    time_range: SelectionWidget,
    options: SelectionWidget,
}

impl CollageSettings {
    /// Builds and renders the widgets. Unknown query values select the first
    /// option.
    pub fn from_query(query: &SettingsQuery) -> Result<Self, WidgetError> {
        let size_index = query
            .size
            .as_deref()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .and_then(|s| COLLAGE_SIZES.iter().position(|&c| c == s))
            .unwrap_or(0);
        let sort_index = query
            .sort_by
            .as_deref()
            .and_then(|s| s.parse::<SortKey>().ok())
            .and_then(|k| SortKey::ALL.iter().position(|&c| c == k))
            .unwrap_or(0);
        let range_index = query
            .time_range
            .as_deref()
            .and_then(|s| s.parse::<TimeRange>().ok())
            .and_then(|r| TimeRange::ALL.iter().position(|&c| c == r))
            .unwrap_or(0);

        let size_items = COLLAGE_SIZES
            .iter()
            .map(|s| SelectOption::new(format!("{s}x{s}"), s.to_string()))
            .collect();
        let sort_items = SortKey::ALL
            .iter()
            .map(|k| SelectOption::new(k.label(), k.as_str()))
            .collect();
        let range_items = TimeRange::ALL
            .iter()
            .map(|r| SelectOption::new(r.label(), r.as_str()))
            .collect();

        let mut settings = Self {
            size: single("msCollageSize", size_items, size_index)?,
            sort_by: single("msSortBy", sort_items, sort_index)?,
            time_range: single("msTimeRange", range_items, range_index)?,
            options: SelectionWidget::new(
                "msOptions",
                WidgetOptions {
                    mode: SelectionMode::Multi,
                    items: vec![SelectOption::new("Unique albums only", UNIQUE_OPTION)],
                    selected_indices: if query.unique.as_deref().map(str::trim) == Some("true") {
                        vec![0]
                    } else {
                        Vec::new()
                    },
                    ..WidgetOptions::default()
                },
            )?
            .on_change(log_change),
        };

        for kind in SettingKind::ALL {
            settings.widget_mut(kind).initialize();
        }
        Ok(settings)
    }

    pub fn widget(&self, kind: SettingKind) -> &SelectionWidget {
        match kind {
            SettingKind::Size => &self.size,
            SettingKind::SortBy => &self.sort_by,
            SettingKind::TimeRange => &self.time_range,
            SettingKind::Options => &self.options,
        }
    }

    fn widget_mut(&mut self, kind: SettingKind) -> &mut SelectionWidget {
        match kind {
            SettingKind::Size => &mut self.size,
            SettingKind::SortBy => &mut self.sort_by,
            SettingKind::TimeRange => &mut self.time_range,
            SettingKind::Options => &mut self.options,
        }
    }

    /// Recomputes the collage parameters from the current selections.
    pub fn config(&self) -> CollageConfig {
        let defaults = CollageConfig::default();
        let selected = |widget: &SelectionWidget| {
            widget
                .selected_item()
                .map(|item| item.value.clone())
                .unwrap_or_default()
        };

        CollageConfig {
            size: selected(&self.size).parse().unwrap_or(defaults.size),
            time_range: selected(&self.time_range)
                .parse()
                .unwrap_or(defaults.time_range),
            sort_by: selected(&self.sort_by).parse().unwrap_or(defaults.sort_by),
            unique_only: self
                .options
                .selected_items()
                .iter()
                .any(|item| item.value == UNIQUE_OPTION),
        }
    }

    /// The settings that result from clicking button `index` of `kind`.
    pub fn toggled(&self, kind: SettingKind, index: usize) -> Result<Self, WidgetError> {
        let mut next = self.clone();
        next.widget_mut(kind).toggle(index)?;
        Ok(next)
    }

    pub fn to_query(&self) -> SettingsQuery {
        let config = self.config();
        SettingsQuery {
            size: Some(config.size.to_string()),
            time_range: Some(config.time_range.to_string()),
            sort_by: Some(config.sort_by.to_string()),
            unique: Some(config.unique_only.to_string()),
        }
    }

    /// URL-encoded form of [`to_query`](Self::to_query), used for page links.
    pub fn query_string(&self) -> String {
        let query = self.to_query();
        let pairs = [
            ("size", query.size),
            ("time_range", query.time_range),
            ("sort_by", query.sort_by),
            ("unique", query.unique),
        ];

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            if let Some(value) = value {
                serializer.append_pair(key, &value);
            }
        }
        serializer.finish()
    }
}

fn single(
    container: &str,
    items: Vec<SelectOption>,
    selected_index: usize,
) -> Result<SelectionWidget, WidgetError> {
    Ok(SelectionWidget::new(
        container,
        WidgetOptions {
            mode: SelectionMode::Single,
            items,
            selected_index,
            ..WidgetOptions::default()
        },
    )?
    .on_change(log_change))
}

fn log_change(event: &SelectionEvent<'_>) {
    debug!(
        container = event.container,
        selected_index = event.selected_index,
        selected_indices = ?event.selected_indices,
        "selection changed"
    );
}
