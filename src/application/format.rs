//! Rendering of order notifications and the daily digest.
//!
//! Order notifications are Telegram `MarkdownV2`: every dynamic value goes
//! through [`escape_markdown`]. The digest is plain text, with titles run
//! through [`sanitize`] so nothing in them can look like markup.

use chrono::{DateTime, FixedOffset, Utc};

use crate::domain::{Order, OrderItem};
use crate::port::outbound::channel::{TextFormat, MAX_MEDIA_GROUP};

use super::digest::Digest;

/// Shown instead of a delivery date that is missing or unparseable.
pub const DATE_PLACEHOLDER: &str = "Не указано";

/// Characters that carry meaning in Telegram markup.
const MARKUP_CHARS: [char; 18] = [
    '*', '_', '`', '[', ']', '(', ')', '~', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Text plus the images to send with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    /// Non-empty image URLs in item order, at most [`MAX_MEDIA_GROUP`].
    pub image_urls: Vec<String>,
    pub format: TextFormat,
}

impl RenderedMessage {
    /// A plain-text message without images.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_urls: Vec::new(),
            format: TextFormat::Plain,
        }
    }
}

/// Accumulates `MarkdownV2` text, escaping everything that is not markup.
#[derive(Default)]
struct MarkdownBuilder {
    out: String,
}

impl MarkdownBuilder {
    fn text(&mut self, raw: &str) -> &mut Self {
        self.out.push_str(&escape_markdown(raw));
        self
    }

    fn bold(&mut self, raw: &str) -> &mut Self {
        self.out.push('*');
        self.out.push_str(&escape_markdown(raw));
        self.out.push('*');
        self
    }

    fn newline(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Renders domain values into channel messages.
#[derive(Debug, Clone, Copy)]
pub struct MessageFormatter {
    offset: FixedOffset,
}

impl MessageFormatter {
    /// Create a formatter that shows dates in `offset`.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Render a notification for `items` of `order`.
    ///
    /// `items` is usually the subset not yet announced; numbering and the
    /// quantity total cover only those items.
    #[must_use]
    pub fn render(&self, order: &Order, items: &[&OrderItem]) -> RenderedMessage {
        let id = order.id.as_str();
        let mut md = MarkdownBuilder::default();

        md.text("📦 ").bold(&format!("Новый заказ №{id}")).newline().newline();
        for (index, item) in items.iter().enumerate() {
            md.text(&format!("{}. ", index + 1))
                .bold(&item.display_title())
                .newline()
                .text(&format!("   Количество: {} шт.", item.quantity))
                .newline();
        }

        let total: u64 = items.iter().map(|item| u64::from(item.quantity)).sum();
        md.newline()
            .text("🚚 ")
            .bold("Доставка до:")
            .text(&format!(" {}", self.format_date(order.deliver_until)))
            .newline()
            .text("📊 ")
            .bold("Общее количество товаров:")
            .text(&format!(" {total} шт."))
            .newline()
            .text("🆔 ")
            .bold("ID заказа:")
            .text(&format!(" {id}"));

        let image_urls = items
            .iter()
            .filter_map(|item| item.image_url.as_deref())
            .filter(|url| !url.trim().is_empty())
            .take(MAX_MEDIA_GROUP)
            .map(ToOwned::to_owned)
            .collect();

        RenderedMessage {
            text: md.finish(),
            image_urls,
            format: TextFormat::Markdown,
        }
    }

    /// Render a notification covering every item of `order`.
    #[must_use]
    pub fn render_order(&self, order: &Order) -> RenderedMessage {
        let items: Vec<&OrderItem> = order.items.iter().collect();
        self.render(order, &items)
    }

    /// Render the daily digest as plain text.
    #[must_use]
    pub fn render_digest(&self, digest: &Digest) -> String {
        let mut text = format!(
            "📊 ЕЖЕДНЕВНЫЙ ОТЧЕТ\n\n📦 Всего заказов за сегодня: {}\n🛍️ Всего товаров: {}\n\n",
            digest.order_count(),
            digest.item_count()
        );

        let sections: Vec<String> = digest
            .orders()
            .iter()
            .filter(|order| !order.items.is_empty())
            .map(|order| {
                let lines: Vec<String> = order
                    .items
                    .iter()
                    .map(|item| format!("   - {} ({} шт.)", sanitize(&item.title), item.quantity))
                    .collect();
                format!("📦 Заказ №{}:\n{}", order.id, lines.join("\n"))
            })
            .collect();

        if sections.is_empty() {
            text.push_str("⚠️ Нет данных о заказах за сегодня.");
        } else {
            text.push_str("📋 СПИСОК ЗАКАЗОВ:\n");
            text.push_str(&sections.join("\n\n"));
        }
        text
    }

    /// `dd.mm.YYYY` in the formatter's timezone, or the placeholder.
    #[must_use]
    pub fn format_date(&self, at: Option<DateTime<Utc>>) -> String {
        at.map_or_else(
            || DATE_PLACEHOLDER.to_string(),
            |at| at.with_timezone(&self.offset).format("%d.%m.%Y").to_string(),
        )
    }
}

/// Replace every markup-sensitive character with a space.
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if MARKUP_CHARS.contains(&c) { ' ' } else { c })
        .collect()
}

/// Escape special characters for Telegram `MarkdownV2`.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if MARKUP_CHARS.contains(&c) || c == '\\' {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn formatter() -> MessageFormatter {
        MessageFormatter::new(FixedOffset::east_opt(5 * 3600).unwrap())
    }

    fn all(order: &Order) -> Vec<&OrderItem> {
        order.items.iter().collect()
    }

    #[test]
    fn render_order_without_images() {
        let order = Order::new("42", vec![OrderItem::new("Mug", 3)]);
        let message = formatter().render(&order, &all(&order));

        assert!(message.text.contains("№42"));
        assert!(message.text.contains("Mug"));
        assert!(message.text.contains("Количество: 3 шт"));
        assert!(message.text.contains("Не указано"));
        assert!(message.image_urls.is_empty());
        assert_eq!(message.format, TextFormat::Markdown);
    }

    #[test]
    fn render_layout_is_escaped_markdown() {
        let order = Order::new("7", vec![OrderItem::new("Cup", 2)]);
        let message = formatter().render(&order, &all(&order));

        assert_eq!(
            message.text,
            "📦 *Новый заказ №7*\n\n\
             1\\. *Cup*\n   Количество: 2 шт\\.\n\n\
             🚚 *Доставка до:* Не указано\n\
             📊 *Общее количество товаров:* 2 шт\\.\n\
             🆔 *ID заказа:* 7"
        );
    }

    #[test]
    fn render_escapes_untrusted_titles() {
        let order = Order::new("1", vec![OrderItem::new("50% *off* [sale]", 1).with_variant("L-XL")]);
        let message = formatter().render(&order, &all(&order));
        assert!(message.text.contains("*50% \\*off\\* \\[sale\\] \\(L\\-XL\\)*"));
    }

    #[test]
    fn render_caps_images_at_ten() {
        let items: Vec<OrderItem> = (0..15)
            .map(|i| OrderItem::new(format!("Item {i}"), 1).with_image(format!("https://img/{i}.jpg")))
            .collect();
        let order = Order::new("9", items);
        let message = formatter().render(&order, &all(&order));

        assert_eq!(message.image_urls.len(), 10);
        assert_eq!(message.image_urls[0], "https://img/0.jpg");
        assert_eq!(message.image_urls[9], "https://img/9.jpg");
    }

    #[test]
    fn render_skips_blank_image_urls() {
        let order = Order::new(
            "9",
            vec![
                OrderItem::new("a", 1).with_image(""),
                OrderItem::new("b", 1),
                OrderItem::new("c", 1).with_image("https://img/c.jpg"),
            ],
        );
        let message = formatter().render(&order, &all(&order));
        assert_eq!(message.image_urls, vec!["https://img/c.jpg"]);
    }

    #[test]
    fn render_subset_totals_only_subset() {
        let order = Order::new("5", vec![OrderItem::new("a", 2), OrderItem::new("b", 5)]);
        let subset = vec![&order.items[1]];
        let message = formatter().render(&order, &subset);

        assert!(message.text.contains("1\\. *b*"));
        assert!(!message.text.contains("*a*"));
        assert!(message.text.contains("товаров:* 5 шт"));
    }

    #[test]
    fn delivery_date_uses_offset() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 20, 30, 0).unwrap();
        assert_eq!(formatter().format_date(Some(at)), "02.03.2024");
        assert_eq!(formatter().format_date(None), DATE_PLACEHOLDER);
    }

    #[test]
    fn sanitize_replaces_markup_with_spaces() {
        assert_eq!(sanitize("a*b_c`d"), "a b c d");
        assert_eq!(
            sanitize("[x](y)~>#+-=|{}.!"),
            format!(" x  y {}", " ".repeat(11))
        );
        assert_eq!(sanitize("Кружка"), "Кружка");
    }

    #[test]
    fn escape_markdown_escapes_specials() {
        assert_eq!(escape_markdown("hello"), "hello");
        assert_eq!(escape_markdown("hello_world"), "hello\\_world");
        assert_eq!(escape_markdown("*bold*"), "\\*bold\\*");
        assert_eq!(escape_markdown("test.com"), "test\\.com");
        assert_eq!(escape_markdown("a\\b"), "a\\\\b");
    }

    #[test]
    fn digest_lists_orders_with_sanitized_titles() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let digest = Digest::new(
            today,
            vec![
                Order::new("1", vec![OrderItem::new("Mug *big*", 2)]),
                Order::new("2", vec![OrderItem::new("Cup", 1), OrderItem::new("Plate", 4)]),
            ],
        );
        let text = formatter().render_digest(&digest);

        assert!(text.starts_with("📊 ЕЖЕДНЕВНЫЙ ОТЧЕТ\n\n"));
        assert!(text.contains("Всего заказов за сегодня: 2"));
        assert!(text.contains("Всего товаров: 7"));
        assert!(text.contains("📦 Заказ №1:\n   - Mug  big  (2 шт.)"));
        assert!(text.contains("📦 Заказ №2:\n   - Cup (1 шт.)\n   - Plate (4 шт.)"));
    }

    #[test]
    fn empty_digest_says_so() {
        let digest = Digest::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), vec![]);
        let text = formatter().render_digest(&digest);
        assert!(text.contains("Всего заказов за сегодня: 0"));
        assert!(text.ends_with("⚠️ Нет данных о заказах за сегодня."));
    }
}
