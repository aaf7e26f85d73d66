//! Cards for fetched Pokémon (shared between TUI and CLI)

use crate::client::Pokemon;
use colored::Colorize;
use serde::{Serialize, Serializer};

/// Badge color for a Pokémon type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const fn rgb(r: u8, g: u8, b: u8) -> TypeColor {
    TypeColor { r, g, b }
}

/// Used for any type missing from [`TYPE_COLORS`]
pub const DEFAULT_TYPE_COLOR: TypeColor = rgb(0xa8, 0xa8, 0x78);

const TYPE_COLORS: &[(&str, TypeColor)] = &[
    ("fire", rgb(0xf0, 0x80, 0x30)),
    ("water", rgb(0x68, 0x90, 0xf0)),
    ("grass", rgb(0x78, 0xc8, 0x50)),
    ("electric", rgb(0xf8, 0xd0, 0x30)),
    ("psychic", rgb(0xf8, 0x58, 0x88)),
    ("ice", rgb(0x98, 0xd8, 0xd8)),
    ("dragon", rgb(0x70, 0x38, 0xf8)),
    ("dark", rgb(0x70, 0x58, 0x48)),
    ("fairy", rgb(0xee, 0x99, 0xac)),
    ("normal", rgb(0xa8, 0xa8, 0x78)),
    ("fighting", rgb(0xc0, 0x30, 0x28)),
    ("flying", rgb(0xa8, 0x90, 0xf0)),
    ("poison", rgb(0xa0, 0x40, 0xa0)),
    ("ground", rgb(0xe0, 0xc0, 0x68)),
    ("rock", rgb(0xb8, 0xa0, 0x38)),
    ("bug", rgb(0xa8, 0xb8, 0x20)),
    ("ghost", rgb(0x70, 0x58, 0x98)),
    ("steel", rgb(0xb8, 0xb8, 0xd0)),
];

impl TypeColor {
    pub fn for_type(name: &str) -> Self {
        TYPE_COLORS
            .iter()
            .find(|(t, _)| *t == name)
            .map(|(_, c)| *c)
            .unwrap_or(DEFAULT_TYPE_COLOR)
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to ratatui Color
    pub fn to_ratatui(&self) -> ratatui::style::Color {
        ratatui::style::Color::Rgb(self.r, self.g, self.b)
    }
}

impl Serialize for TypeColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: String,
    pub color: TypeColor,
}

/// One result card: name, image and a badge per type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: u32,
    pub name: String,
    pub image_url: Option<String>,
    pub badges: Vec<Badge>,
}

impl Card {
    pub fn from_pokemon(pokemon: &Pokemon) -> Self {
        Self {
            id: pokemon.id,
            name: pokemon.name.clone(),
            image_url: pokemon.image_url().map(str::to_string),
            badges: pokemon
                .type_names()
                .map(|t| Badge {
                    label: t.to_string(),
                    color: TypeColor::for_type(t),
                })
                .collect(),
        }
    }

    /// Render to CLI output using colored crate
    pub fn to_cli_lines(&self) -> Vec<String> {
        let line1 = format!(
            "{} {}",
            format!("#{:03}", self.id).dimmed(),
            self.name.bold()
        );

        let badges: Vec<String> = self
            .badges
            .iter()
            .map(|b| {
                format!(" {} ", b.label)
                    .black()
                    .on_truecolor(b.color.r, b.color.g, b.color.b)
                    .to_string()
            })
            .collect();
        let line2 = format!("  {}", badges.join(" "));

        let mut lines = vec![line1, line2];
        if let Some(ref url) = self.image_url {
            lines.push(format!("  {}", url.dimmed()));
        }
        lines
    }

    /// Render to ratatui Lines for TUI
    pub fn to_tui_lines(
        &self,
        base_style: ratatui::style::Style,
    ) -> Vec<ratatui::text::Line<'static>> {
        use ratatui::style::{Color, Modifier};
        use ratatui::text::{Line, Span};

        let line1 = Line::from(vec![
            Span::styled(
                format!(" #{:03} ", self.id),
                base_style.fg(Color::DarkGray),
            ),
            Span::styled(
                self.name.clone(),
                base_style.fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]);

        let mut badge_spans = vec![Span::styled("      ".to_string(), base_style)];
        for (i, badge) in self.badges.iter().enumerate() {
            if i > 0 {
                badge_spans.push(Span::styled(" ".to_string(), base_style));
            }
            badge_spans.push(Span::styled(
                format!(" {} ", badge.label),
                base_style.fg(Color::Black).bg(badge.color.to_ratatui()),
            ));
        }
        let line2 = Line::from(badge_spans);

        let image = self.image_url.as_deref().unwrap_or("no image");
        let line3 = Line::from(vec![
            Span::styled("      ".to_string(), base_style),
            Span::styled(image.to_string(), base_style.fg(Color::DarkGray)),
        ]);

        vec![line1, line2, line3]
    }
}

/// One card per record, in fetched order
pub fn render_cards(records: &[Pokemon]) -> Vec<Card> {
    records.iter().map(Card::from_pokemon).collect()
}
