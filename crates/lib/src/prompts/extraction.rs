//! # Field Extraction Prompts
//!
//! Prompt templates for the four extraction modes and the inference pass that
//! fills whatever the modes and the regex fallback left empty.

// --- High Accuracy ---

pub const HIGH_ACCURACY_SYSTEM_PROMPT: &str = "You are an expert insurance GLR extractor. Produce accurate concise values for each placeholder. Normalize dates (MM/DD/YYYY). Prefer explicit evidence. Don't hallucinate contradictions.";

/// Placeholders: `{placeholders}`, `{pdf_text}`
pub const HIGH_ACCURACY_USER_PROMPT: &str = r#"Placeholders:
{placeholders}

PDF TEXT:
----BEGIN----
{pdf_text}
----END----

Return ONLY JSON:
{ "mapping": {...}, "confidences": {...} }"#;

// --- Strict Validation ---

pub const STRICT_VALIDATION_SYSTEM_PROMPT: &str = "You are a strict validator. Mark each field as VERIFIED, INFERRED, or MISSING. Provide evidence for each field.";

/// Placeholders: `{placeholders}`, `{pdf_text}`
pub const STRICT_VALIDATION_USER_PROMPT: &str = r#"Placeholders:
{placeholders}

PDF TEXT:
----BEGIN----
{pdf_text}
----END----

Return ONLY JSON: { mapping:{}, status:{}, reasons:{} }"#;

// --- Field Audit ---

pub const FIELD_AUDIT_SYSTEM_PROMPT: &str =
    "Extract each placeholder value and provide 1–2 sentence evidence.";

/// Placeholders: `{placeholders}`, `{pdf_text}`
pub const FIELD_AUDIT_USER_PROMPT: &str = r#"Placeholders:
{placeholders}

PDF TEXT:
----BEGIN----
{pdf_text}
----END----

Return ONLY JSON: {"field_values":{}, "evidence":{}}"#;

// --- Multi-LLM Voting ---

/// Placeholders: `{temperature}`
pub const VOTING_SYSTEM_PROMPT: &str = "You are an extractor (voting pass temp={temperature}). Return ONLY JSON mapping placeholders->values.";

/// Placeholders: `{placeholders}`, `{pdf_text}`
pub const VOTING_USER_PROMPT: &str = r#"Placeholders:
{placeholders}

PDF TEXT:
----BEGIN----
{pdf_text}
----END----
Return ONLY raw JSON."#;

/// Sampling temperatures for successive voting rounds.
pub const VOTING_TEMPERATURES: [f32; 3] = [0.0, 0.2, 0.6];

// --- No-Missing-Data Inference ---

pub const INFERENCE_SYSTEM_PROMPT: &str =
    "Infer missing insurance fields. NEVER output empty or N/A.";

/// Placeholders: `{fields}`, `{pdf_text}`
pub const INFERENCE_USER_PROMPT: &str =
    "Fill these fields: {fields}\nPDF TEXT:\n{pdf_text}\nReturn ONLY JSON.";

// --- Token budgets ---

pub const SINGLE_PASS_MAX_TOKENS: u32 = 1500;
pub const VOTING_MAX_TOKENS: u32 = 1200;
pub const INFERENCE_MAX_TOKENS: u32 = 800;
