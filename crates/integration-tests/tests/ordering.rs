#![allow(clippy::unwrap_used)]

//! End-to-end ordering, cart and payment scenarios.

use chrono::Duration;
use lunchroom_bot::command::Command;
use lunchroom_core::{ChatId, PaymentStatus};
use lunchroom_integration_tests::{SentKind, TestContext, sample_menu_for, tomorrow};

#[tokio::test]
async fn test_order_two_items_then_pay_flips_both() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(200);
    ctx.seed_address("Main St 1").await;
    ctx.register_customer(chat, "+7 916 000 00 00", "Ann").await;

    ctx.send_text(chat, "Сделать заказ").await;
    let picker = ctx.last_to(chat);
    assert_eq!(picker.text, "Выберите дату:");
    match &picker.kind {
        SentKind::InlineKeyboard { buttons } => assert_eq!(buttons.len(), 7),
        other => panic!("expected date picker, got {other:?}"),
    }

    ctx.send_callback(chat, &Command::date_payload(tomorrow())).await;
    let menu = ctx.last_to(chat);
    assert!(menu.text.contains("Меню на"));
    match &menu.kind {
        SentKind::ReplyKeyboard { labels } => {
            // The set lunch is one button; a-la-carte dishes are their own.
            assert!(labels.contains(&"Комплексный обед".to_string()));
            assert!(labels.contains(&"Цезарь".to_string()));
            assert!(labels.contains(&"Чай".to_string()));
            assert!(!labels.contains(&"Борщ".to_string()));
        }
        other => panic!("expected selection keyboard, got {other:?}"),
    }

    ctx.send_text(chat, "Комплексный обед").await;
    assert!(
        ctx.texts_to(chat)
            .iter()
            .any(|t| t.contains("Ваш выбор (Комплексный обед) записан"))
    );
    ctx.send_text(chat, "Цезарь").await;

    ctx.send_text(chat, "Корзина").await;
    let cart = ctx.last_to(chat);
    assert!(cart.text.contains("Комплексный обед"));
    assert!(cart.text.contains("Цезарь"));
    assert!(cart.text.contains("Итого к оплате: 350 руб."));

    ctx.send_callback(chat, "pay_now").await;
    assert!(
        ctx.texts_to(chat)
            .iter()
            .any(|t| t.contains("Ваши заказы успешно оплачены!"))
    );

    let lines = ctx.state.ledger().lines_for_phone("79160000000").await.unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.status == PaymentStatus::Paid));

    // The cart still lists both items, now paid.
    ctx.send_text(chat, "Корзина").await;
    let cart = ctx.last_to(chat);
    assert!(cart.text.contains("Комплексный обед"));
    assert!(cart.text.contains("Цезарь"));
    assert!(cart.text.contains("Оплачено"));
}

#[tokio::test]
async fn test_unknown_label_never_creates_a_line_item() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(201);
    ctx.seed_address("Main St 1").await;
    ctx.register_customer(chat, "+7 916 000 00 00", "Ann").await;

    ctx.send_text(chat, "Сделать заказ").await;
    ctx.send_callback(chat, &Command::date_payload(tomorrow())).await;
    ctx.send_text(chat, "Пицца").await;

    assert_eq!(
        ctx.last_to(chat).text,
        "Цена для Пицца не найдена в меню."
    );
    assert!(ctx.state.ledger().all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_selection_without_date_prompts_for_date() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(202);
    ctx.seed_address("Main St 1").await;
    ctx.register_customer(chat, "+7 916 000 00 00", "Ann").await;

    // Date picker is open but nothing picked yet.
    ctx.send_text(chat, "Сделать заказ").await;
    ctx.send_text(chat, "Чай").await;

    assert_eq!(
        ctx.last_to(chat).text,
        "Выберите дату, прежде чем заказывать обед."
    );
    assert!(ctx.state.ledger().all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_date_without_menu_is_reported() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(203);
    ctx.seed_address("Main St 1").await;
    ctx.register_customer(chat, "+7 916 000 00 00", "Ann").await;

    ctx.send_text(chat, "Сделать заказ").await;
    // The sample menu only covers tomorrow's weekday.
    let bare_date = tomorrow() + Duration::days(1);
    ctx.send_callback(chat, &Command::date_payload(bare_date)).await;

    assert_eq!(ctx.last_to(chat).text, "К сожалению, на эту дату нет меню.");
}

#[tokio::test]
async fn test_cancel_removes_only_the_selected_date() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(204);
    ctx.seed_address("Main St 1").await;
    ctx.register_customer(chat, "+7 916 000 00 00", "Ann").await;

    ctx.send_text(chat, "Сделать заказ").await;
    ctx.send_callback(chat, &Command::date_payload(tomorrow())).await;
    ctx.send_text(chat, "Комплексный обед").await;
    ctx.send_text(chat, "Чай").await;

    // A row for another date, outside the cancel scope.
    let other_date = tomorrow() + Duration::days(7);
    ctx.state
        .ledger()
        .append(lunchroom_bot::store::OrderLine {
            phone: "79160000000".to_string(),
            date: other_date,
            weekday: "Понедельник".to_string(),
            item: "Цезарь".to_string(),
            price: lunchroom_core::Price::new(rust_decimal::Decimal::from(100)),
            status: PaymentStatus::Unpaid,
        })
        .await
        .unwrap();

    ctx.send_text(chat, "Мои заказы").await;
    let review = ctx.last_to(chat);
    assert!(review.text.contains("Итого к оплате: 300 руб."));
    match &review.kind {
        SentKind::ReplyKeyboard { labels } => {
            assert!(labels.contains(&"Оплатить".to_string()));
            assert!(labels.contains(&"Отмена".to_string()));
        }
        other => panic!("expected pay/cancel keyboard, got {other:?}"),
    }

    ctx.send_text(chat, "Отмена").await;
    assert!(
        ctx.texts_to(chat)
            .iter()
            .any(|t| t.contains("Ваши заказы успешно отменены!"))
    );

    let remaining = ctx.state.ledger().all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].date, other_date);
}

#[tokio::test]
async fn test_pay_with_no_orders_reports_nothing_to_pay() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(205);
    ctx.seed_address("Main St 1").await;
    ctx.register_customer(chat, "+7 916 000 00 00", "Ann").await;

    ctx.send_text(chat, "Сделать заказ").await;
    ctx.send_callback(chat, &Command::date_payload(tomorrow())).await;
    ctx.send_text(chat, "Оплатить").await;

    assert_eq!(ctx.last_to(chat).text, "У вас нет заказов на эту дату.");
}

#[tokio::test]
async fn test_duplicate_selection_is_two_line_items() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(206);
    ctx.seed_address("Main St 1").await;
    ctx.register_customer(chat, "+7 916 000 00 00", "Ann").await;

    ctx.send_text(chat, "Сделать заказ").await;
    ctx.send_callback(chat, &Command::date_payload(tomorrow())).await;
    ctx.send_text(chat, "Чай").await;
    ctx.send_text(chat, "Чай").await;

    let lines = ctx.state.ledger().all().await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], lines[1]);
}
