use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::PLACEHOLDER_BODY;
use crate::error::PayloadError;
use crate::variants::VariantForm;

/// Generation bucket, always in `1..=9`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u8);

impl Generation {
    pub const ALL: [Generation; 9] = [
        Generation(1),
        Generation(2),
        Generation(3),
        Generation(4),
        Generation(5),
        Generation(6),
        Generation(7),
        Generation(8),
        Generation(9),
    ];

    /// Last id of each generation.
    const BREAKPOINTS: [(u32, u8); 9] = [
        (151, 1),
        (251, 2),
        (386, 3),
        (493, 4),
        (649, 5),
        (721, 6),
        (809, 7),
        (898, 8),
        (1025, 9),
    ];

    /// Tag a base id. Ids past the last breakpoint fall back to generation 1.
    pub fn from_id(id: u32) -> Self {
        Self::BREAKPOINTS
            .iter()
            .find(|(last, _)| id <= *last)
            .map(|&(_, g)| Generation(g))
            .unwrap_or(Generation(1))
    }

    pub fn new(n: u8) -> Option<Self> {
        (1..=9).contains(&n).then_some(Generation(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based bucket index.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generation {}", self.0)
    }
}

/// Which of an entry's two images is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteStyle {
    /// Small front sprite, pixel art.
    #[default]
    Pixel,
    /// Official artwork rendering.
    Artwork,
}

/// One selectable catalog record. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub primary_image: String,
    pub alternate_image: Option<String>,
    pub generation: Generation,
}

impl CatalogEntry {
    /// Image for the given style; artwork falls back to the sprite when absent.
    pub fn image_for(&self, style: SpriteStyle) -> &str {
        match (style, self.alternate_image.as_deref()) {
            (SpriteStyle::Artwork, Some(art)) if !art.is_empty() => art,
            _ => &self.primary_image,
        }
    }
}

// Wire shape of `GET /pokemon/{idOrName}`; everything else in the payload is ignored.
#[derive(Deserialize)]
struct ApiPokemon {
    id: u32,
    name: String,
    #[serde(default)]
    sprites: ApiSprites,
}

#[derive(Deserialize, Default)]
struct ApiSprites {
    front_default: Option<String>,
    #[serde(default)]
    other: Option<ApiOtherSprites>,
}

#[derive(Deserialize, Default)]
struct ApiOtherSprites {
    #[serde(rename = "official-artwork", default)]
    official_artwork: Option<ApiArtwork>,
}

#[derive(Deserialize)]
struct ApiArtwork {
    front_default: Option<String>,
}

/// Validated catalog payload, not yet tagged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogPayload {
    pub id: u32,
    pub name: String,
    pub primary_image: String,
    pub alternate_image: Option<String>,
}

impl CatalogPayload {
    /// Validate a raw response body.
    pub fn parse(body: &str) -> Result<Self, PayloadError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(PayloadError::Empty);
        }
        if trimmed == PLACEHOLDER_BODY {
            return Err(PayloadError::Placeholder(trimmed.to_string()));
        }
        let api: ApiPokemon = serde_json::from_str(trimmed)?;
        let alternate_image = api
            .sprites
            .other
            .and_then(|o| o.official_artwork)
            .and_then(|a| a.front_default);
        Ok(CatalogPayload {
            id: api.id,
            name: api.name,
            primary_image: api.sprites.front_default.unwrap_or_default(),
            alternate_image,
        })
    }

    /// Base entry, tagged from its own id.
    pub fn into_base_entry(self) -> CatalogEntry {
        let generation = Generation::from_id(self.id);
        CatalogEntry {
            id: self.id,
            name: self.name,
            primary_image: self.primary_image,
            alternate_image: self.alternate_image,
            generation,
        }
    }

    /// Variant entry: curated label, tagged from the curated base id.
    pub fn into_variant_entry(self, form: &VariantForm) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            name: form.display_name.to_string(),
            primary_image: self.primary_image,
            alternate_image: self.alternate_image,
            generation: Generation::from_id(form.base_id),
        }
    }
}

/// Case-insensitive substring match on `name`; input order is preserved.
pub fn filter<'a>(entries: &'a [CatalogEntry], term: &str) -> Vec<&'a CatalogEntry> {
    let needle = term.to_lowercase();
    entries
        .iter()
        .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
        .collect()
}

/// Keep only entries of one generation (`None` keeps everything).
pub fn filter_by_generation<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    generation: Option<Generation>,
) -> Vec<&'a CatalogEntry> {
    entries
        .into_iter()
        .filter(|e| generation.is_none_or(|g| e.generation == g))
        .collect()
}

/// Partition into the nine fixed buckets, stable within each bucket.
pub fn group_by_generation<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
) -> Vec<(Generation, Vec<&'a CatalogEntry>)> {
    let mut buckets: Vec<(Generation, Vec<&'a CatalogEntry>)> =
        Generation::ALL.iter().map(|g| (*g, Vec::new())).collect();
    for e in entries {
        buckets[e.generation.index()].1.push(e);
    }
    buckets
}

/// Capitalize the first character for list display.
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Search term plus generation filter, as driven by the selector header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub term: String,
    pub generation: Option<Generation>,
}

impl CatalogQuery {
    pub fn apply<'a>(&self, entries: &'a [CatalogEntry]) -> Vec<&'a CatalogEntry> {
        filter_by_generation(filter(entries, &self.term), self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, name: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            name: name.to_string(),
            primary_image: format!("https://img/{id}.png"),
            alternate_image: None,
            generation: Generation::from_id(id),
        }
    }

    #[test]
    fn generation_boundaries_match_table() {
        let table = [
            (1, 1),
            (151, 1),
            (152, 2),
            (251, 2),
            (252, 3),
            (386, 3),
            (387, 4),
            (493, 4),
            (494, 5),
            (649, 5),
            (650, 6),
            (721, 6),
            (722, 7),
            (809, 7),
            (810, 8),
            (898, 8),
            (899, 9),
            (1025, 9),
        ];
        for (id, gen_no) in table {
            assert_eq!(Generation::from_id(id).number(), gen_no, "id {id}");
        }
    }

    #[test]
    fn out_of_range_id_falls_back_to_first_generation() {
        assert_eq!(Generation::from_id(1026).number(), 1);
        assert_eq!(Generation::from_id(10091).number(), 1);
    }

    #[test]
    fn generation_new_rejects_out_of_range() {
        assert!(Generation::new(0).is_none());
        assert!(Generation::new(10).is_none());
        assert_eq!(Generation::new(4).map(Generation::index), Some(3));
        assert_eq!(Generation::new(9).unwrap().to_string(), "Generation 9");
    }

    #[test]
    fn parse_reads_both_images() {
        let body = r#"{
            "id": 25,
            "name": "pikachu",
            "base_experience": 112,
            "sprites": {
                "front_default": "https://img/25.png",
                "other": { "official-artwork": { "front_default": "https://art/25.png" } }
            }
        }"#;
        let p = CatalogPayload::parse(body).unwrap();
        assert_eq!(p.id, 25);
        assert_eq!(p.name, "pikachu");
        assert_eq!(p.primary_image, "https://img/25.png");
        assert_eq!(p.alternate_image.as_deref(), Some("https://art/25.png"));
        assert_eq!(p.into_base_entry().generation.number(), 1);
    }

    #[test]
    fn parse_tolerates_missing_sprites() {
        let p = CatalogPayload::parse(r#"{"id": 7, "name": "squirtle"}"#).unwrap();
        assert_eq!(p.primary_image, "");
        assert!(p.alternate_image.is_none());
    }

    #[test]
    fn parse_rejects_empty_placeholder_and_garbage() {
        assert!(matches!(CatalogPayload::parse(""), Err(PayloadError::Empty)));
        assert!(matches!(CatalogPayload::parse("  \n"), Err(PayloadError::Empty)));
        assert!(matches!(
            CatalogPayload::parse("OK"),
            Err(PayloadError::Placeholder(_))
        ));
        assert!(matches!(
            CatalogPayload::parse("<html>"),
            Err(PayloadError::Malformed(_))
        ));
        assert!(matches!(
            CatalogPayload::parse(r#"{"name": "no-id"}"#),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn variant_entry_uses_label_and_base_generation() {
        let form = VariantForm {
            api_name: "slowking-galar",
            display_name: "Galarian Slowking",
            base_id: 199,
        };
        let p = CatalogPayload {
            id: 10172,
            name: "slowking-galar".into(),
            primary_image: "https://img/10172.png".into(),
            alternate_image: None,
        };
        let e = p.into_variant_entry(&form);
        assert_eq!(e.id, 10172);
        assert_eq!(e.name, "Galarian Slowking");
        assert_eq!(e.generation.number(), 2);
    }

    #[test]
    fn filter_is_case_insensitive_and_keeps_order() {
        let list = vec![
            entry(4, "charmander"),
            entry(25, "pikachu"),
            entry(5, "charmeleon"),
            entry(37, "Alolan Vulpix"),
            entry(6, "charizard"),
        ];
        let hits: Vec<u32> = filter(&list, "ChAr").iter().map(|e| e.id).collect();
        assert_eq!(hits, vec![4, 5, 6]);
        let hits: Vec<u32> = filter(&list, "alolan").iter().map(|e| e.id).collect();
        assert_eq!(hits, vec![37]);
        assert_eq!(filter(&list, "").len(), list.len());
        assert!(filter(&list, "mew").is_empty());
    }

    #[test]
    fn group_by_generation_is_exact_and_stable() {
        let list = vec![
            entry(152, "chikorita"),
            entry(1, "bulbasaur"),
            entry(1025, "pecharunt"),
            entry(151, "mew"),
        ];
        let groups = group_by_generation(&list);
        assert_eq!(groups.len(), 9);
        let gen1: Vec<u32> = groups[0].1.iter().map(|e| e.id).collect();
        assert_eq!(gen1, vec![1, 151]);
        assert_eq!(groups[1].1.len(), 1);
        assert_eq!(groups[8].1[0].id, 1025);
        let total: usize = groups.iter().map(|(_, g)| g.len()).sum();
        assert_eq!(total, list.len());
    }

    #[test]
    fn query_combines_term_and_generation() {
        let list = vec![entry(4, "charmander"), entry(390, "chimchar"), entry(25, "pikachu")];
        let q = CatalogQuery {
            term: "char".into(),
            generation: Generation::new(4),
        };
        let hits: Vec<u32> = q.apply(&list).iter().map(|e| e.id).collect();
        assert_eq!(hits, vec![390]);
        assert_eq!(CatalogQuery::default().apply(&list).len(), 3);
    }

    #[test]
    fn image_for_prefers_artwork_when_present() {
        let mut e = entry(1, "bulbasaur");
        assert_eq!(e.image_for(SpriteStyle::Artwork), "https://img/1.png");
        e.alternate_image = Some("https://art/1.png".into());
        assert_eq!(e.image_for(SpriteStyle::Artwork), "https://art/1.png");
        assert_eq!(e.image_for(SpriteStyle::Pixel), "https://img/1.png");
    }

    #[test]
    fn display_name_capitalizes_first_char() {
        assert_eq!(display_name("bulbasaur"), "Bulbasaur");
        assert_eq!(display_name("Alolan Vulpix"), "Alolan Vulpix");
        assert_eq!(display_name(""), "");
    }
}
