use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use super::{IntakeError, IntakeResult};

/// Minimum length of the free-text business description
pub const MIN_DESCRIPTION_CHARS: usize = 50;
/// The form stops accepting input past this length
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Upper bound for an attached supporting document
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Defines a form selection enum with its wire slug and display label
macro_rules! selection_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($slug:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $slug)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn slug(&self) -> &'static str {
                match self { $($name::$variant => $slug),+ }
            }

            pub fn label(&self) -> &'static str {
                match self { $($name::$variant => $label),+ }
            }
        }

        impl FromStr for $name {
            type Err = IntakeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.slug().eq_ignore_ascii_case(s))
                    .ok_or_else(|| IntakeError::UnknownOption {
                        field: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.slug())
            }
        }
    };
}

selection_enum!(
    /// Which Gulf markets the business targets
    TargetMarket {
        UaeSaudi => ("uae-saudi", "UAE & Saudi Arabia"),
        UaeSaudiQatar => ("uae-saudi-qatar", "UAE, Saudi Arabia & Qatar"),
        AllGcc => ("all-gcc", "All GCC Countries"),
        KuwaitBahrain => ("kuwait-bahrain", "Kuwait & Bahrain"),
        Oman => ("oman", "Oman Only"),
    }
);

selection_enum!(
    BusinessStage {
        Idea => ("idea", "Idea Stage"),
        Mvp => ("mvp", "MVP Development"),
        EarlyRevenue => ("early-revenue", "Early Revenue"),
        Growth => ("growth", "Growth Stage"),
        Scaling => ("scaling", "Scaling"),
    }
);

selection_enum!(
    BusinessModel {
        B2bSaas => ("b2b-saas", "B2B SaaS"),
        B2cApp => ("b2c-app", "B2C App"),
        Marketplace => ("marketplace", "Marketplace"),
        ECommerce => ("e-commerce", "E-commerce"),
        Fintech => ("fintech", "Fintech"),
        HealthTech => ("healthtech", "HealthTech"),
        EdTech => ("edtech", "EdTech"),
        Logistics => ("logistics", "Logistics"),
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    Txt,
}

impl DocumentKind {
    fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            "txt" => Some(DocumentKind::Txt),
            _ => None,
        }
    }
}

/// Supporting document attached to a request. Only metadata travels with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredDocument")]
pub struct DocumentAttachment {
    file_name: String,
    kind: DocumentKind,
    size_bytes: u64,
}

impl DocumentAttachment {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> IntakeResult<Self> {
        let file_name = file_name.into();
        let kind = DocumentKind::from_file_name(&file_name)
            .ok_or_else(|| IntakeError::UnsupportedDocument(file_name.clone()))?;
        if size_bytes > MAX_DOCUMENT_BYTES {
            return Err(IntakeError::DocumentTooLarge {
                size: size_bytes,
                max: MAX_DOCUMENT_BYTES,
            });
        }
        Ok(Self { file_name, kind, size_bytes })
    }

    pub fn from_path(path: &Path) -> IntakeResult<Self> {
        let metadata = std::fs::metadata(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IntakeError::UnsupportedDocument(path.display().to_string()))?;
        Self::new(file_name, metadata.len())
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Everything the user entered in the intake wizard. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredRequest")]
pub struct AnalysisRequest {
    business_description: String,
    target_markets: TargetMarket,
    business_stage: BusinessStage,
    business_model: BusinessModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document: Option<DocumentAttachment>,
}

impl AnalysisRequest {
    pub fn new(
        business_description: impl Into<String>,
        target_markets: TargetMarket,
        business_stage: BusinessStage,
        business_model: BusinessModel,
    ) -> IntakeResult<Self> {
        let business_description = business_description.into();
        let len = business_description.trim().chars().count();
        if len < MIN_DESCRIPTION_CHARS {
            return Err(IntakeError::DescriptionTooShort {
                len,
                min: MIN_DESCRIPTION_CHARS,
            });
        }
        Ok(Self {
            business_description,
            target_markets,
            business_stage,
            business_model,
            document: None,
        })
    }

    pub fn with_document(mut self, document: DocumentAttachment) -> Self {
        self.document = Some(document);
        self
    }

    pub fn business_description(&self) -> &str {
        &self.business_description
    }

    pub fn target_markets(&self) -> TargetMarket {
        self.target_markets
    }

    pub fn business_stage(&self) -> BusinessStage {
        self.business_stage
    }

    pub fn business_model(&self) -> BusinessModel {
        self.business_model
    }

    pub fn document(&self) -> Option<&DocumentAttachment> {
        self.document.as_ref()
    }
}

// Deserialized values go back through the constructors, so a stored or
// hand-edited request is held to the same rules as one from the wizard.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument {
    file_name: String,
    size_bytes: u64,
}

impl TryFrom<StoredDocument> for DocumentAttachment {
    type Error = IntakeError;

    fn try_from(stored: StoredDocument) -> IntakeResult<Self> {
        Self::new(stored.file_name, stored.size_bytes)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRequest {
    business_description: String,
    target_markets: TargetMarket,
    business_stage: BusinessStage,
    business_model: BusinessModel,
    #[serde(default)]
    document: Option<DocumentAttachment>,
}

impl TryFrom<StoredRequest> for AnalysisRequest {
    type Error = IntakeError;

    fn try_from(stored: StoredRequest) -> IntakeResult<Self> {
        let request = Self::new(
            stored.business_description,
            stored.target_markets,
            stored.business_stage,
            stored.business_model,
        )?;
        Ok(match stored.document {
            Some(document) => request.with_document(document),
            None => request,
        })
    }
}
