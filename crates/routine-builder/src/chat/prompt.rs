// Prompt text for chat requests.
//
// The system preamble is rebuilt for every request and always describes the
// selection as it stands at send time. A routine request also lists the
// products in its user message.

use crate::catalog::Product;

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

const ADVISOR_INSTRUCTIONS: &str = "You are a friendly beauty and skincare advisor. \
Help the user understand the products they have chosen and build routines from them. \
Only discuss skincare, haircare, makeup, fragrance and related topics; politely decline anything else. \
Keep answers short and practical. Use headings, bullet points and numbered steps where they help.";

/// Build the system preamble: advisor instructions followed by a summary of
/// `selection`.
pub fn system_prompt(selection: &[Product]) -> String {
    format!("{ADVISOR_INSTRUCTIONS}\n\n{}", selection_summary(selection))
}

// ---------------------------------------------------------------------------
// Selection formatting
// ---------------------------------------------------------------------------

/// One line per product, or a note that nothing is selected.
pub fn selection_summary(products: &[Product]) -> String {
    if products.is_empty() {
        return "The user has not selected any products yet.".to_string();
    }
    let mut out = String::from("The user has selected these products:\n");
    out.push_str(&format_products(products));
    out
}

fn format_products(products: &[Product]) -> String {
    products
        .iter()
        .map(|p| {
            format!(
                "- {} by {} ({}): {}",
                p.name, p.brand, p.category, p.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Routine prompt
// ---------------------------------------------------------------------------

/// User message asking for a routine built from `products`.
pub fn routine_prompt(products: &[Product]) -> String {
    format!(
        "Build a personalized routine using these products:\n{}\n\n\
         Explain the order to apply them, whether each belongs in the morning, \
         evening or both, and any tips for using them together.",
        format_products(products)
    )
}
