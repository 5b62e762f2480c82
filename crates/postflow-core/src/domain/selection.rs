use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Which parts of a post a partial regeneration touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSelection {
    pub text: bool,
    pub hashtags: bool,
    pub image: bool,
}

impl PartialSelection {
    pub fn is_empty(&self) -> bool {
        !(self.text || self.hashtags || self.image)
    }
}

/// A field of a partial regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionField {
    Text,
    Hashtags,
    Image,
}

/// What the user asked to regenerate.
///
/// Whole-post regeneration supersedes every partial flag, so the two cases
/// are separate variants rather than four independent booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SelectionFlags", into = "SelectionFlags")]
pub enum RegenerationSelection {
    WholePost,
    Partial(PartialSelection),
}

impl Default for RegenerationSelection {
    fn default() -> Self {
        RegenerationSelection::Partial(PartialSelection::default())
    }
}

impl RegenerationSelection {
    pub fn is_whole_post(&self) -> bool {
        matches!(self, RegenerationSelection::WholePost)
    }

    /// Toggle whole-post mode. Turning it on clears the partial flags.
    pub fn set_whole_post(&mut self, on: bool) {
        *self = if on {
            RegenerationSelection::WholePost
        } else {
            RegenerationSelection::Partial(PartialSelection::default())
        };
    }

    /// Toggle one partial flag. Enabling a flag while whole-post mode is on
    /// is rejected; disabling one is a no-op.
    pub fn set_field(&mut self, field: SelectionField, on: bool) -> Result<(), DomainError> {
        match self {
            RegenerationSelection::WholePost if on => Err(DomainError::validation(
                "whole-post regeneration is selected; clear it before choosing individual parts",
            )),
            RegenerationSelection::WholePost => Ok(()),
            RegenerationSelection::Partial(partial) => {
                match field {
                    SelectionField::Text => partial.text = on,
                    SelectionField::Hashtags => partial.hashtags = on,
                    SelectionField::Image => partial.image = on,
                }
                Ok(())
            }
        }
    }

    /// Flag view of the selection, as the UI renders it.
    pub fn flags(&self) -> SelectionFlags {
        (*self).into()
    }
}

/// The four-checkbox wire shape of a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionFlags {
    #[serde(default)]
    pub text: bool,
    #[serde(default)]
    pub hashtags: bool,
    #[serde(default)]
    pub image: bool,
    #[serde(default)]
    pub post: bool,
}

impl TryFrom<SelectionFlags> for RegenerationSelection {
    type Error = DomainError;

    fn try_from(flags: SelectionFlags) -> Result<Self, Self::Error> {
        if flags.post {
            if flags.text || flags.hashtags || flags.image {
                return Err(DomainError::validation(
                    "whole-post regeneration cannot be combined with text, hashtags or image",
                ));
            }
            return Ok(RegenerationSelection::WholePost);
        }
        Ok(RegenerationSelection::Partial(PartialSelection {
            text: flags.text,
            hashtags: flags.hashtags,
            image: flags.image,
        }))
    }
}

impl From<RegenerationSelection> for SelectionFlags {
    fn from(selection: RegenerationSelection) -> Self {
        match selection {
            RegenerationSelection::WholePost => SelectionFlags {
                post: true,
                ..Default::default()
            },
            RegenerationSelection::Partial(p) => SelectionFlags {
                text: p.text,
                hashtags: p.hashtags,
                image: p.image,
                post: false,
            },
        }
    }
}
