//! Color themes and the style registry
//!
//! A [`Theme`] maps token categories to display attributes. Themes only list
//! the categories they care about; lookups fall back through
//! [`Category::parent`] and finally to "no attribute", so every theme is total.
//!
//! The built-in themes are syntect's bundled ones, converted by resolving
//! one representative scope per category.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use syntect::highlighting::{self, FontStyle, Highlighter, ThemeSet};
use syntect::parsing::Scope;

use crate::error::{PrettyError, Result};
use crate::token::Category;

/// Reserved name for the bundled built-in theme
pub const DEFAULT_STYLE: &str = "default";

/// Registry name [`DEFAULT_STYLE`] resolves to
pub const DEFAULT_THEME: &str = "solarized-dark";

/// Reserved name that disables coloring entirely
pub const NO_STYLE: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

// xterm defaults for the 16 standard colors
const ANSI16: [Rgb; 16] = [
    Rgb::hex(0x000000),
    Rgb::hex(0xcd0000),
    Rgb::hex(0x00cd00),
    Rgb::hex(0xcdcd00),
    Rgb::hex(0x0000ee),
    Rgb::hex(0xcd00cd),
    Rgb::hex(0x00cdcd),
    Rgb::hex(0xe5e5e5),
    Rgb::hex(0x7f7f7f),
    Rgb::hex(0xff0000),
    Rgb::hex(0x00ff00),
    Rgb::hex(0xffff00),
    Rgb::hex(0x5c5cff),
    Rgb::hex(0xff00ff),
    Rgb::hex(0x00ffff),
    Rgb::hex(0xffffff),
];

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    fn distance(self, other: Rgb) -> u32 {
        let d = |a: u8, b: u8| (a as i32 - b as i32).pow(2) as u32;
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }

    /// Nearest entry of the xterm 256-color palette (cube or gray ramp)
    pub fn to_xterm256(self) -> u8 {
        let level = |c: u8| {
            CUBE_LEVELS
                .iter()
                .enumerate()
                .min_by_key(|(_, l)| (c as i32 - **l as i32).abs())
                .map(|(i, _)| i)
                .unwrap_or(0)
        };
        let (ri, gi, bi) = (level(self.r), level(self.g), level(self.b));
        let cube = Rgb {
            r: CUBE_LEVELS[ri],
            g: CUBE_LEVELS[gi],
            b: CUBE_LEVELS[bi],
        };
        let cube_index = 16 + 36 * ri + 6 * gi + bi;

        let average = (self.r as u32 + self.g as u32 + self.b as u32) / 3;
        let gray_step = ((average.saturating_sub(8) + 5) / 10).min(23);
        let gray_value = (8 + gray_step * 10) as u8;
        let gray = Rgb {
            r: gray_value,
            g: gray_value,
            b: gray_value,
        };

        if gray.distance(self) < cube.distance(self) {
            232 + gray_step as u8
        } else {
            cube_index as u8
        }
    }

    /// Nearest of the 16 standard terminal colors, as an index in `0..16`
    pub fn to_ansi16(self) -> u8 {
        ANSI16
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.distance(self))
            .map(|(i, _)| i as u8)
            .unwrap_or(7)
    }
}

/// How one category is displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attr {
    pub color: Option<Rgb>,
    pub bold: bool,
}

impl Attr {
    pub const fn fg(hex: u32) -> Self {
        Self {
            color: Some(Rgb::hex(hex)),
            bold: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn is_plain(&self) -> bool {
        self.color.is_none() && !self.bold
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    name: String,
    entries: HashMap<Category, Attr>,
}

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    pub fn with(mut self, category: Category, attr: Attr) -> Self {
        self.entries.insert(category, attr);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute for `category`, inherited from the nearest styled ancestor
    pub fn attr(&self, category: Category) -> Attr {
        category
            .lineage()
            .find_map(|c| self.entries.get(&c).copied())
            .unwrap_or_default()
    }
}

// Scope each category is colored like
const CATEGORY_SCOPES: &[(Category, &str)] = &[
    (Category::Error, "invalid"),
    (Category::Comment, "comment"),
    (Category::CommentPreproc, "meta.preprocessor"),
    (Category::Punctuation, "punctuation"),
    (Category::Operator, "keyword.operator"),
    (Category::Keyword, "keyword"),
    (Category::KeywordConstant, "constant.language"),
    (Category::Name, "entity.name"),
    (Category::NameTag, "entity.name.tag"),
    (Category::NameAttribute, "entity.other.attribute-name"),
    (Category::NameEntity, "constant.character.entity"),
    (Category::NameNamespace, "entity.name.namespace"),
    (Category::String, "string"),
    (Category::Number, "constant.numeric"),
];

static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Registry key for a syntect theme name: "Solarized (dark)" is `solarized-dark`
pub fn style_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            key.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() && !key.ends_with('-') {
            key.push('-');
        }
    }
    key
}

impl Theme {
    /// Convert a syntect theme
    ///
    /// Categories whose scope renders in the theme's plain foreground are
    /// left unstyled.
    pub fn from_syntect(name: impl Into<String>, theme: &highlighting::Theme) -> Self {
        let highlighter = Highlighter::new(theme);
        let plain = theme.settings.foreground;
        let mut converted = Theme::new(name);

        for (category, scope) in CATEGORY_SCOPES {
            let Ok(scope) = Scope::new(scope) else {
                continue;
            };
            let style = highlighter.style_for_stack(&[scope]);
            let attr = Attr {
                color: Some(style.foreground)
                    .filter(|color| Some(*color) != plain)
                    .map(|c| Rgb { r: c.r, g: c.g, b: c.b }),
                bold: style.font_style.contains(FontStyle::BOLD),
            };
            if !attr.is_plain() {
                converted = converted.with(*category, attr);
            }
        }
        converted
    }
}

/// Named themes available to [`StyleRegistry::resolve`]
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    themes: BTreeMap<String, Theme>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StyleRegistry {
    /// A registry with no themes; only the reserved names resolve, and
    /// [`DEFAULT_STYLE`] only once a [`DEFAULT_THEME`] is registered
    pub fn empty() -> Self {
        Self {
            themes: BTreeMap::new(),
        }
    }

    /// Every theme bundled with syntect, keyed by [`style_key`]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (name, theme) in &theme_set().themes {
            registry.register(Theme::from_syntect(style_key(name), theme));
        }
        registry
    }

    /// Add or replace a theme under its own name
    pub fn register(&mut self, theme: Theme) {
        self.themes.insert(theme.name().to_string(), theme);
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    /// Resolve a style name
    ///
    /// `Ok(None)` means coloring is disabled ([`NO_STYLE`]).
    pub fn resolve(&self, name: &str) -> Result<Option<Theme>> {
        match name {
            NO_STYLE => Ok(None),
            DEFAULT_STYLE => self.resolve(DEFAULT_THEME),
            other => self
                .get(other)
                .cloned()
                .map(Some)
                .ok_or_else(|| PrettyError::StyleNotFound(other.to_string())),
        }
    }

    /// Every name [`resolve`](Self::resolve) accepts
    pub fn available_styles(&self) -> Vec<String> {
        [DEFAULT_STYLE, NO_STYLE]
            .into_iter()
            .map(str::to_string)
            .chain(self.themes.keys().cloned())
            .collect()
    }
}
