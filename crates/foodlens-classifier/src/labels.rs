//! Class lists mapping model outputs to human-readable labels

use foodlens_core::{Error, Result};
use std::path::Path;

/// The 100 dish categories of the default food model, in category id order (id 1 first)
pub const FOOD_CLASSES: [&str; 100] = [
    "rice",
    "eels on rice",
    "pilaf",
    "chicken- n -egg on rice",
    "pork cutlet on rice",
    "beef curry",
    "sushi",
    "chicken rice",
    "fried rice",
    "tempura bowl",
    "bibimbap",
    "toast",
    "croissant",
    "roll bread",
    "raisin bread",
    "chip butty",
    "hamburger",
    "pizza",
    "sandwiches",
    "udon noodle",
    "tempura udon",
    "soba noodle",
    "ramen noodle",
    "beef noodle",
    "tensin noodle",
    "fried noodle",
    "spaghetti",
    "Japanese-style pancake",
    "takoyaki",
    "gratin",
    "sauteed vegetables",
    "croquette",
    "grilled eggplant",
    "sauteed spinach",
    "vegetable tempura",
    "miso soup",
    "potage",
    "sausage",
    "oden",
    "omelet",
    "ganmodoki",
    "jiaozi",
    "stew",
    "teriyaki grilled fish",
    "fried fish",
    "grilled salmon",
    "salmon meuniere",
    "sashimi",
    "grilled pacific saury",
    "sukiyaki",
    "sweet and sour pork",
    "lightly roasted fish",
    "steamed egg hotchpotch",
    "tempura",
    "fried chicken",
    "sirloin cutlet",
    "nanbanzuke",
    "boiled fish",
    "seasoned beef with potatoes",
    "hambarg steak",
    "beef steak",
    "dried fish",
    "ginger pork saute",
    "spicy chili-flavored tofu",
    "yakitori",
    "cabbage roll",
    "rolled omelet",
    "egg sunny-side up",
    "fermented soybeans",
    "cold tofu",
    "egg roll",
    "chilled noodle",
    "stir-fried beef and peppers",
    "simmered pork",
    "boiled chicken and vegetables",
    "sashimi bowl",
    "sushi bowl",
    "fish-shaped pancake with bean jam",
    "shrimp with chill source",
    "roast chicken",
    "steamed meat dumpling",
    "omelet with fried rice",
    "cutlet curry",
    "spaghetti meat sauce",
    "fried shrimp",
    "potato salad",
    "green salad",
    "macaroni salad",
    "Japanese tofu and vegetable chowder",
    "pork miso soup",
    "chinese soup",
    "beef bowl",
    "kinpira-style sauteed burdock",
    "rice ball",
    "pizza toast",
    "dipping noodles",
    "hot dog",
    "french fries",
    "mixed rice",
    "goya chanpuru",
];

/// Fixed ordered list of class names, with an optional training vocabulary.
///
/// Without a vocabulary, model output `i` is `labels[i]`. With one, output `i`
/// carries the 1-based category id `vocab[i]` and resolves to `labels[id - 1]`.
/// Training pipelines that sort category names as strings ("1", "10", "100",
/// "11", ...) produce exactly this indirection.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassList {
    labels: Vec<String>,
    vocab: Option<Vec<usize>>,
}

impl ClassList {
    /// Create a class list; labels are trimmed of surrounding whitespace
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_string())
            .collect();

        if labels.is_empty() {
            return Err(Error::config("class list is empty"));
        }
        if let Some(pos) = labels.iter().position(|l| l.is_empty()) {
            return Err(Error::config(format!("class list entry {} is blank", pos)));
        }

        Ok(Self {
            labels,
            vocab: None,
        })
    }

    /// The built-in food category list, with the vocabulary the default model
    /// was trained with
    pub fn food() -> Self {
        Self {
            labels: FOOD_CLASSES.iter().map(|s| s.to_string()).collect(),
            vocab: Some(food_vocab()),
        }
    }

    /// Load labels from a text file, one per line; blank lines are skipped
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to read class list {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::new(content.lines().filter(|line| !line.trim().is_empty()))
    }

    /// Attach a training vocabulary of 1-based category ids
    pub fn with_vocab<I, S>(mut self, vocab: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ids = Vec::new();
        for (pos, entry) in vocab.into_iter().enumerate() {
            let entry = entry.as_ref().trim();
            let id: usize = entry.parse().map_err(|_| {
                Error::config(format!(
                    "vocabulary entry {} ('{}') is not a category id",
                    pos, entry
                ))
            })?;
            if id == 0 || id > self.labels.len() {
                return Err(Error::config(format!(
                    "vocabulary entry {} refers to category {} but the class list has {} entries",
                    pos,
                    id,
                    self.labels.len()
                )));
            }
            ids.push(id);
        }

        if ids.is_empty() {
            return Err(Error::config("vocabulary is empty"));
        }

        self.vocab = Some(ids);
        Ok(self)
    }

    /// Load a vocabulary file, one category id per line
    pub fn with_vocab_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to read vocabulary {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        self.with_vocab(content.lines().filter(|line| !line.trim().is_empty()))
    }

    /// Number of outputs the model head must produce
    pub fn output_len(&self) -> usize {
        self.vocab.as_ref().map_or(self.labels.len(), Vec::len)
    }

    /// Map a model output index to its label
    pub fn resolve(&self, index: usize) -> Result<&str> {
        let position = match &self.vocab {
            Some(vocab) => {
                let id = vocab.get(index).ok_or_else(|| {
                    Error::classifier(format!(
                        "output index {} outside vocabulary of {}",
                        index,
                        vocab.len()
                    ))
                })?;
                id - 1
            }
            None => index,
        };

        self.labels.get(position).map(String::as_str).ok_or_else(|| {
            Error::classifier(format!(
                "output index {} outside class list of {}",
                index,
                self.labels.len()
            ))
        })
    }

    /// All labels in class-list order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Whether a vocabulary indirection is in use
    pub fn has_vocab(&self) -> bool {
        self.vocab.is_some()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Food category ids in the order the default model emits them.
///
/// The model was trained on folders named `1` to `100`, and the folder names
/// were sorted as strings: `1, 10, 100, 11, ..., 19, 2, 20, ...`.
pub fn food_vocab() -> Vec<usize> {
    let mut ids: Vec<usize> = (1..=FOOD_CLASSES.len()).collect();
    ids.sort_by_key(|id| id.to_string());
    ids
}

impl Default for ClassList {
    fn default() -> Self {
        Self::food()
    }
}
