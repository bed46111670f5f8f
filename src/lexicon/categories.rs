//! Embedded category trigger tables
//!
//! Two tables ship with the binary: the chat table drives escalation, token
//! budget, thinking mode and prompt variant; the document table picks a
//! professional domain for document requests.

use crate::classify::{Category, CategoryTable, Trigger};
use crate::error::AppResult;

pub const COMPLEX: &str = "complex";
pub const LEGAL: &str = "legal";
pub const DEEP_ANALYSIS: &str = "deep_analysis";
pub const EXTENDED_OUTPUT: &str = "extended_output";
pub const DOCUMENT_REQUEST: &str = "document_request";
pub const THINKING: &str = "thinking";
pub const IMAGE_REQUEST: &str = "image_request";

/// Chat categories that escalate a paid tier
pub const ESCALATION_CATEGORIES: [&str; 3] = [COMPLEX, LEGAL, DEEP_ANALYSIS];

/// Chat categories that lift the token ceiling
pub const EXTENDED_CATEGORIES: [&str; 2] = [EXTENDED_OUTPUT, DOCUMENT_REQUEST];

/// Domain reported when the document table has no hit
pub const GENERAL_DOMAIN: &str = "general";

pub const CHAT_TABLE: &str = "chat";
pub const DOMAIN_TABLE: &str = "domain";

struct CategorySpec {
    name: &'static str,
    threshold: f64,
    weighted: &'static [(&'static str, f64)],
    mandatory: &'static [&'static str],
    intents: &'static [&'static str],
}

const CHAT: &[CategorySpec] = &[
    CategorySpec {
        name: COMPLEX,
        threshold: 0.6,
        weighted: &[
            ("explain in detail", 0.5),
            ("step by step", 0.4),
            ("compare and contrast", 0.6),
            ("pros and cons", 0.4),
            ("trade-offs", 0.4),
            ("comprehensive", 0.4),
            ("in-depth", 0.5),
            ("complex", 0.4),
            ("complicated", 0.4),
            ("strategy", 0.3),
            ("architecture", 0.3),
            ("algorithm", 0.3),
            ("optimise", 0.3),
            ("optimize", 0.3),
            ("derive", 0.3),
            ("multi-step", 0.4),
        ],
        mandatory: &[],
        intents: &[],
    },
    CategorySpec {
        name: LEGAL,
        threshold: 0.5,
        weighted: &[
            ("legal", 0.4),
            ("law", 0.3),
            ("lawyer", 0.5),
            ("attorney", 0.5),
            ("advocate", 0.3),
            ("contract", 0.4),
            ("lawsuit", 0.5),
            ("court", 0.3),
            ("constitution", 0.4),
            ("labour law", 0.6),
            ("unfair dismissal", 0.6),
            ("eviction", 0.5),
            ("tenant", 0.3),
            ("compliance", 0.3),
            ("regulation", 0.3),
            ("rights", 0.3),
            ("wet", 0.3),
            ("hof", 0.3),
            ("kontrak", 0.4),
        ],
        mandatory: &[
            "popia",
            "rica",
            "ccma",
            "sars",
            "umthetho",
            "ngomthetho",
            "molao",
            "mulayo",
            "nawu",
            "regsadvies",
            "prokureur",
        ],
        intents: &[],
    },
    CategorySpec {
        name: DEEP_ANALYSIS,
        threshold: 0.5,
        weighted: &[
            ("in-depth analysis", 0.7),
            ("detailed analysis", 0.7),
            ("root cause", 0.5),
            ("analyse", 0.4),
            ("analyze", 0.4),
            ("analysis", 0.4),
            ("critically", 0.4),
            ("critique", 0.4),
            ("implications", 0.3),
            ("assess", 0.3),
            ("investigate", 0.3),
            ("evaluate", 0.3),
            ("research", 0.3),
        ],
        mandatory: &[],
        intents: &[],
    },
    CategorySpec {
        name: EXTENDED_OUTPUT,
        threshold: 0.5,
        weighted: &[
            ("detailed report", 0.6),
            ("full report", 0.6),
            ("write a long", 0.6),
            ("as long as possible", 0.6),
            ("essay", 0.5),
            ("chapter", 0.4),
            ("extensive", 0.4),
            ("thorough", 0.3),
            ("elaborate", 0.3),
        ],
        mandatory: &[],
        intents: &[r"\b\d{3,5}[\s-]*words?\b", r"\b\d{1,3}\s*pages?\b"],
    },
    CategorySpec {
        name: DOCUMENT_REQUEST,
        threshold: 0.5,
        weighted: &[
            ("business plan", 0.6),
            ("cover letter", 0.6),
            ("proposal", 0.4),
            ("memo", 0.4),
            ("cv", 0.4),
            ("document", 0.3),
            ("template", 0.3),
            ("draft", 0.3),
            ("docx", 0.5),
            ("pdf", 0.3),
        ],
        mandatory: &[],
        intents: &[
            r"\b(?:draft|write|prepare|create|generate)\b.{0,30}\b(?:document|letter|report|proposal|memo|cv|resume|contract|policy|business plan)\b",
        ],
    },
    CategorySpec {
        name: THINKING,
        threshold: 0.5,
        weighted: &[
            ("think step by step", 0.7),
            ("think carefully", 0.6),
            ("think it through", 0.6),
            ("reason through", 0.6),
            ("reasoning", 0.4),
            ("puzzle", 0.4),
            ("riddle", 0.4),
            ("proof", 0.4),
            ("logic", 0.3),
            ("calculate", 0.3),
            ("solve", 0.3),
            ("math", 0.3),
        ],
        mandatory: &[],
        intents: &[],
    },
    CategorySpec {
        name: IMAGE_REQUEST,
        threshold: 0.6,
        weighted: &[
            ("illustration", 0.4),
            ("image", 0.3),
            ("picture", 0.3),
            ("drawing", 0.3),
            ("logo", 0.3),
            ("poster", 0.3),
            ("photo", 0.2),
        ],
        mandatory: &[],
        intents: &[
            r"\b(?:draw|paint|sketch|generate|create|make|design|render)\b.{0,30}\b(?:image|picture|photo|illustration|drawing|logo|poster|artwork)s?\b",
            r"\b(?:image|picture|photo|illustration) of\b",
        ],
    },
];

const DOMAINS: &[CategorySpec] = &[
    CategorySpec {
        name: "legal",
        threshold: 0.4,
        weighted: &[
            ("power of attorney", 0.7),
            ("terms and conditions", 0.6),
            ("affidavit", 0.7),
            ("popia", 0.6),
            ("contract", 0.5),
            ("legal", 0.5),
            ("lawyer", 0.5),
            ("lease", 0.5),
            ("law", 0.4),
            ("court", 0.4),
            ("agreement", 0.4),
            ("compliance", 0.4),
            ("umthetho", 0.6),
            ("molao", 0.6),
        ],
        mandatory: &[],
        intents: &[],
    },
    CategorySpec {
        name: "business",
        threshold: 0.4,
        weighted: &[
            ("business plan", 0.8),
            ("business", 0.5),
            ("spaza", 0.5),
            ("marketing", 0.4),
            ("proposal", 0.4),
            ("pitch", 0.4),
            ("startup", 0.4),
            ("company", 0.3),
            ("customers", 0.3),
            ("revenue", 0.3),
            ("sales", 0.3),
            ("strategy", 0.3),
        ],
        mandatory: &[],
        intents: &[],
    },
    CategorySpec {
        name: "technical",
        threshold: 0.4,
        weighted: &[
            ("system design", 0.6),
            ("api", 0.5),
            ("database", 0.5),
            ("specification", 0.5),
            ("technical", 0.5),
            ("software", 0.4),
            ("code", 0.4),
            ("architecture", 0.4),
            ("deployment", 0.4),
            ("server", 0.4),
            ("documentation", 0.3),
        ],
        mandatory: &[],
        intents: &[],
    },
    CategorySpec {
        name: "academic",
        threshold: 0.4,
        weighted: &[
            ("research paper", 0.7),
            ("literature review", 0.7),
            ("thesis", 0.7),
            ("dissertation", 0.7),
            ("essay", 0.5),
            ("citation", 0.5),
            ("academic", 0.5),
            ("assignment", 0.4),
            ("university", 0.4),
            ("references", 0.3),
            ("abstract", 0.3),
        ],
        mandatory: &[],
        intents: &[],
    },
    CategorySpec {
        name: "medical",
        threshold: 0.4,
        weighted: &[
            ("diagnosis", 0.6),
            ("medical", 0.5),
            ("patient", 0.5),
            ("symptoms", 0.5),
            ("medication", 0.5),
            ("hiv", 0.5),
            ("clinic", 0.4),
            ("doctor", 0.4),
            ("hospital", 0.4),
            ("treatment", 0.4),
            ("tb", 0.4),
            ("health", 0.3),
        ],
        mandatory: &[],
        intents: &[],
    },
    CategorySpec {
        name: "financial",
        threshold: 0.4,
        weighted: &[
            ("balance sheet", 0.7),
            ("income statement", 0.7),
            ("cash flow", 0.6),
            ("interest rate", 0.5),
            ("budget", 0.5),
            ("financial", 0.5),
            ("tax", 0.5),
            ("sars", 0.5),
            ("investment", 0.5),
            ("accounting", 0.5),
            ("stokvel", 0.5),
            ("invoice", 0.4),
            ("loan", 0.4),
        ],
        mandatory: &[],
        intents: &[],
    },
];

fn build(name: &str, specs: &[CategorySpec]) -> AppResult<CategoryTable> {
    let categories = specs
        .iter()
        .map(|spec| {
            let mut triggers = spec
                .weighted
                .iter()
                .map(|(phrase, weight)| Trigger::new(phrase, *weight))
                .collect::<AppResult<Vec<_>>>()?;
            for phrase in spec.mandatory {
                triggers.push(Trigger::mandatory(phrase)?);
            }
            Category::new(spec.name, spec.threshold, triggers, spec.intents)
        })
        .collect::<AppResult<Vec<_>>>()?;

    CategoryTable::new(name, categories)
}

/// Chat escalation / budget / intent table
pub fn chat_table() -> AppResult<CategoryTable> {
    build(CHAT_TABLE, CHAT)
}

/// Professional document domain table
pub fn domain_table() -> AppResult<CategoryTable> {
    build(DOMAIN_TABLE, DOMAINS)
}
