use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::key::ClassMap;

/// An ordered set of CSS declarations.
///
/// Declarations are kept sorted by property so equal styles compare equal regardless of the order
/// they were built in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `property`, replacing any earlier value.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        let property = property.into();
        let value = value.into();
        match self
            .declarations
            .binary_search_by(|(p, _)| p.as_str().cmp(property.as_str()))
        {
            Ok(i) => self.declarations[i].1 = value,
            Err(i) => self.declarations.insert(i, (property, value)),
        }
        self
    }

    /// Sets `property` to a pixel length.
    pub fn px(self, property: impl Into<String>, value: f64) -> Self {
        self.with(property, format!("{value}px"))
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(p, v)| (p.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// The declaration block body, e.g. `height:20px;position:absolute`.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (i, (property, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            out.push_str(property);
            out.push(':');
            out.push_str(value);
        }
        out
    }
}

/// A generated class name handed back by a [`StyleService`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName(Rc<str>);

impl ClassName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns declarations into class names and hands out the CSS rules that still need installing.
pub trait StyleService {
    fn register(&self, style: &Style) -> ClassName;

    /// Drains rules registered since the previous flush.
    fn flush(&self) -> Vec<String>;
}

/// A [`StyleService`] that lives in an explicit context object.
///
/// Identical declarations share one class; each rule is emitted by [`StyleService::flush`]
/// exactly once.
#[derive(Debug)]
pub struct StyleSheet {
    prefix: String,
    classes: RefCell<ClassMap<Style, ClassName>>,
    pending: RefCell<Vec<String>>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::with_prefix("tv")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            classes: RefCell::new(ClassMap::default()),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Number of distinct classes registered so far.
    pub fn len(&self) -> usize {
        self.classes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.borrow().is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleService for StyleSheet {
    fn register(&self, style: &Style) -> ClassName {
        if let Some(class) = self.classes.borrow().get(style) {
            return class.clone();
        }

        let mut classes = self.classes.borrow_mut();
        let name = format!("{}{}", self.prefix, classes.len());
        let class = ClassName(Rc::from(name.as_str()));
        self.pending
            .borrow_mut()
            .push(format!(".{}{{{}}}", name, style.to_css()));
        classes.insert(style.clone(), class.clone());
        class
    }

    fn flush(&self) -> Vec<String> {
        core::mem::take(&mut *self.pending.borrow_mut())
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        ClassName(Rc::from(name))
    }
}
