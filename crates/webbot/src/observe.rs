//! Observation sources.
//!
//! The browser layer is an external collaborator. Webbot only asks it for a
//! point-in-time read of a named property and a few boolean states. A source
//! must answer `Ok(None)` for a missing attribute but
//! `Err(BotError::ElementNotFound)` when the element itself cannot be located,
//! so the wait engine can tell the two apart.

use crate::result::{BotError, BotResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A readable string property of a page or element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    /// Current page URL
    Url,
    /// Current page title
    Title,
    /// Visible text of an element
    Text,
    /// Tag name of an element
    TagName,
    /// A named attribute of an element
    Attribute(String),
}

impl Property {
    /// Named attribute
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    /// `id` attribute
    #[must_use]
    pub fn id() -> Self {
        Self::attribute("id")
    }

    /// `name` attribute
    #[must_use]
    pub fn name() -> Self {
        Self::attribute("name")
    }

    /// `value` attribute
    #[must_use]
    pub fn value() -> Self {
        Self::attribute("value")
    }

    /// `href` attribute
    #[must_use]
    pub fn href() -> Self {
        Self::attribute("href")
    }

    /// `class` attribute
    #[must_use]
    pub fn class() -> Self {
        Self::attribute("class")
    }

    /// Subject label used in failure messages
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Url => "Url",
            Self::Title => "Title",
            Self::Text => "Text",
            Self::TagName => "Tag name",
            Self::Attribute(name) => name,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Boolean element states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    /// Rendered and visible
    Displayed,
    /// Selected option, or checked checkbox/radio
    Selected,
    /// Not disabled
    Enabled,
}

impl Flag {
    /// Adjective used in messages
    #[must_use]
    pub const fn adjective(self) -> &'static str {
        match self {
            Self::Displayed => "displayed",
            Self::Selected => "selected",
            Self::Enabled => "enabled",
        }
    }
}

/// Point-in-time reads of a page or element.
///
/// Implementations must not cache between calls; each call is a fresh
/// observation.
pub trait Observe {
    /// Current value of `property`; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// [`BotError::ElementNotFound`] when the target cannot be located.
    fn observe(&self, property: &Property) -> BotResult<Option<String>>;

    /// Current state of `flag`.
    ///
    /// # Errors
    ///
    /// [`BotError::ElementNotFound`] when the target cannot be located.
    fn flag(&self, flag: Flag) -> BotResult<bool>;

    /// Options of a `<select>`, in document order; empty for other elements
    ///
    /// # Errors
    ///
    /// [`BotError::ElementNotFound`] when the target cannot be located.
    fn options(&self) -> BotResult<Vec<OptionSnapshot>> {
        Ok(Vec::new())
    }

    /// Short description for messages, e.g. `<button id="save">`
    fn describe(&self) -> String {
        "element".to_string()
    }

    /// Observed value of `property` as a comparable text value
    ///
    /// # Errors
    ///
    /// As [`Observe::observe`].
    fn value_of(&self, property: &Property) -> BotResult<Value> {
        self.observe(property).map(Value::from_observed)
    }

    /// Visible text parsed as a number; absent when it is not numeric
    ///
    /// # Errors
    ///
    /// As [`Observe::observe`].
    fn numeric_text(&self) -> BotResult<Value> {
        let text = self.observe(&Property::Text)?;
        Ok(Value::number_from_observed(text.as_deref()))
    }

    /// Whether the target is currently visible
    ///
    /// # Errors
    ///
    /// As [`Observe::flag`].
    fn is_visible(&self) -> BotResult<bool> {
        self.flag(Flag::Displayed)
    }
}

impl<T: Observe + ?Sized> Observe for &T {
    fn observe(&self, property: &Property) -> BotResult<Option<String>> {
        (**self).observe(property)
    }

    fn flag(&self, flag: Flag) -> BotResult<bool> {
        (**self).flag(flag)
    }

    fn options(&self) -> BotResult<Vec<OptionSnapshot>> {
        (**self).options()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: Observe + ?Sized> Observe for Box<T> {
    fn observe(&self, property: &Property) -> BotResult<Option<String>> {
        (**self).observe(property)
    }

    fn flag(&self, flag: Flag) -> BotResult<bool> {
        (**self).flag(flag)
    }

    fn options(&self) -> BotResult<Vec<OptionSnapshot>> {
        (**self).options()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// One `<option>` of a select element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSnapshot {
    /// Position among the select's options
    pub index: usize,
    /// Visible text
    pub text: String,
    /// `value` attribute
    pub value: Option<String>,
    /// Currently selected
    pub selected: bool,
    /// Not disabled
    pub enabled: bool,
}

impl OptionSnapshot {
    /// Enabled, unselected option
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            value: None,
            selected: false,
            enabled: true,
        }
    }

    /// Set the `value` attribute
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set selection
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Set enablement
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Immutable snapshot of an element (and the page it lives on).
///
/// Useful as a fixture and as an adapter for drivers that hand back a whole
/// element description at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Whether the element exists at all
    pub present: bool,
    /// Tag name
    pub tag_name: String,
    /// Raw text content
    pub text: String,
    /// Attributes by name
    pub attributes: BTreeMap<String, String>,
    /// Page URL
    pub url: Option<String>,
    /// Page title
    pub title: Option<String>,
    /// Visible
    pub displayed: bool,
    /// Selected / checked
    pub selected: bool,
    /// Enabled
    pub enabled: bool,
    /// Options, for select elements
    #[serde(default)]
    pub options: Vec<OptionSnapshot>,
}

impl Default for ElementSnapshot {
    fn default() -> Self {
        Self {
            present: true,
            tag_name: "div".to_string(),
            text: String::new(),
            attributes: BTreeMap::new(),
            url: None,
            title: None,
            displayed: true,
            selected: false,
            enabled: true,
            options: Vec::new(),
        }
    }
}

impl ElementSnapshot {
    /// Visible, enabled element with the given tag
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    /// An element that cannot be located
    #[must_use]
    pub fn missing() -> Self {
        Self {
            present: false,
            ..Self::default()
        }
    }

    /// Set text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set page URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set page title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn displayed(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }

    /// Set selection
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Set enablement
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Append an option; its index is its position
    #[must_use]
    pub fn with_option(mut self, text: impl Into<String>, value: impl Into<String>) -> Self {
        let option = OptionSnapshot::new(self.options.len(), text).with_value(value);
        self.options.push(option);
        self
    }

    /// Append a prepared option, re-indexed to its position
    #[must_use]
    pub fn with_option_snapshot(mut self, mut option: OptionSnapshot) -> Self {
        option.index = self.options.len();
        self.options.push(option);
        self
    }

    fn ensure_present(&self) -> BotResult<()> {
        if self.present {
            Ok(())
        } else {
            Err(BotError::not_found(self.describe()))
        }
    }
}

impl Observe for ElementSnapshot {
    fn observe(&self, property: &Property) -> BotResult<Option<String>> {
        self.ensure_present()?;
        Ok(match property {
            Property::Url => self.url.clone(),
            Property::Title => self.title.clone(),
            // Hidden elements have no visible text
            Property::Text if !self.displayed => Some(String::new()),
            Property::Text => Some(self.text.clone()),
            Property::TagName => Some(self.tag_name.clone()),
            Property::Attribute(name) => self.attributes.get(name).cloned(),
        })
    }

    fn flag(&self, flag: Flag) -> BotResult<bool> {
        self.ensure_present()?;
        Ok(match flag {
            Flag::Displayed => self.displayed,
            Flag::Selected => self.selected,
            Flag::Enabled => self.enabled,
        })
    }

    fn options(&self) -> BotResult<Vec<OptionSnapshot>> {
        self.ensure_present()?;
        Ok(self.options.clone())
    }

    fn describe(&self) -> String {
        let mut out = format!("<{}", self.tag_name);
        for key in ["id", "name", "class"] {
            if let Some(v) = self.attributes.get(key) {
                out.push_str(&format!(" {key}=\"{v}\""));
            }
        }
        out.push('>');
        out
    }
}
