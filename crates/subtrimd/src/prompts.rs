//! Prompt building for the completion collaborator.
//!
//! Every prompt asks for exactly one JSON object and nothing else. The
//! billing_period vocabulary is requested here but not enforced downstream;
//! the coercion layer stays lenient on purpose.

use subtrim_shared::normalize::DraftContext;

/// Shared suffix: the single-object contract.
const JSON_ONLY: &str =
    "Respond with exactly one JSON object and nothing else. No markdown, no prose.";

pub fn classify_subscription(subject: &str, from: &str, excerpt: &str) -> String {
    format!(
        "You classify emails for a subscription-management app.\n\
         Decide whether the email below is a subscription receipt or renewal notice.\n\n\
         Subject: {subject}\n\
         From: {from}\n\
         Excerpt: {excerpt}\n\n\
         Keys: is_subscription (boolean), service_name (string or null), plan (string or null), \
         amount (number or null), currency (ISO 4217 string or null), \
         billing_period (one of monthly|yearly|weekly|quarterly|unknown), \
         billing_email (string or null), confidence (number 0..1).\n\
         {JSON_ONLY}"
    )
}

pub fn price_suggest(subscription_name: &str, country_code: &str) -> String {
    format!(
        "What does {subscription_name} typically cost per month in {country_code}?\n\
         Keys: monthly (number or null), currency (ISO 4217 string or null), \
         confidence (number 0..1), notes (short string).\n\
         {JSON_ONLY}"
    )
}

pub fn cancel_contact(subscription_name: &str, country_code: &str) -> String {
    format!(
        "How does a customer in {country_code} cancel a {subscription_name} subscription?\n\
         Keys: email (support email string or null), cancelURL (direct cancellation page URL \
         or null), confidence (number 0..1), notes (short string).\n\
         {JSON_ONLY}"
    )
}

pub fn draft_cancel_email(ctx: &DraftContext) -> String {
    format!(
        "Draft a short, polite cancellation email for a {} subscription.\n\
         Customer name: {}\n\
         Account email: {}\n\
         Reason: {}\n\
         Keys: subject (string), body (string).\n\
         {JSON_ONLY}",
        ctx.subscription_name,
        ctx.user_name.as_deref().unwrap_or("(not given)"),
        ctx.account_email.as_deref().unwrap_or("(not given)"),
        ctx.reason.as_deref().unwrap_or("(not given)"),
    )
}

pub fn cancel_assist(subscription_name: &str, country_code: &str, ctx: &DraftContext) -> String {
    format!(
        "Help a customer in {country_code} cancel a {subscription_name} subscription.\n\
         Customer name: {}\n\
         Account email: {}\n\
         Keys: email (support email string or null), cancelURL (string or null), \
         confidence (number 0..1), notes (short string), \
         subject (email subject string), body (email body string).\n\
         {JSON_ONLY}",
        ctx.user_name.as_deref().unwrap_or("(not given)"),
        ctx.account_email.as_deref().unwrap_or("(not given)"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_request_a_single_json_object() {
        let ctx = DraftContext {
            subscription_name: "Hulu".to_string(),
            user_name: None,
            account_email: None,
            reason: None,
        };
        for prompt in [
            classify_subscription("s", "f", "e"),
            price_suggest("Hulu", "US"),
            cancel_contact("Hulu", "US"),
            draft_cancel_email(&ctx),
            cancel_assist("Hulu", "US", &ctx),
        ] {
            assert!(prompt.contains("exactly one JSON object"), "{prompt}");
        }
    }

    #[test]
    fn classify_requests_billing_period_vocabulary() {
        let prompt = classify_subscription("s", "f", "e");
        assert!(prompt.contains("monthly|yearly|weekly|quarterly|unknown"));
    }
}
