#![allow(clippy::unwrap_used)]

//! End-to-end registration scenarios.

use lunchroom_core::{ChatId, PhoneNumber, Role};
use lunchroom_integration_tests::{SentKind, TestContext, sample_menu_for, tomorrow};

#[tokio::test]
async fn test_full_registration_creates_customer_profile() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(100);
    ctx.seed_address("Main St 1").await;

    ctx.send_contact(chat, "+7 916 000 00 00").await;

    // The live catalog is offered as inline buttons.
    let offer = ctx.last_to(chat);
    assert_eq!(offer.text, "Выберите адрес доставки:");
    match offer.kind {
        SentKind::InlineKeyboard { buttons } => {
            assert_eq!(buttons, vec![("Main St 1".to_string(), "addr:Main St 1".to_string())]);
        }
        other => panic!("expected inline keyboard, got {other:?}"),
    }

    ctx.send_callback(chat, "addr:Main St 1").await;
    let ack = ctx.last_to(chat);
    assert!(ack.text.contains("Адрес доставки выбран: Main St 1"));
    assert!(matches!(ack.kind, SentKind::Edit { .. }));

    ctx.send_text(chat, "Ann").await;

    let profile = ctx
        .state
        .identity()
        .find_by_phone(&PhoneNumber::normalize("79160000000"))
        .await
        .unwrap()
        .expect("profile should exist");
    assert_eq!(profile.name, "Ann");
    assert_eq!(profile.role, Role::Customer);
    assert_eq!(profile.address, "Main St 1");
    assert_eq!(profile.chat_id, Some(chat));

    let texts = ctx.texts_to(chat);
    assert!(texts.iter().any(|t| t.contains("Регистрация завершена")));
}

#[tokio::test]
async fn test_start_after_registration_skips_contact_request() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(101);
    ctx.seed_address("Main St 1").await;
    ctx.register_customer(chat, "+7 916 000 00 00", "Ann").await;
    ctx.messenger.clear();

    ctx.send_text(chat, "/start").await;

    let welcome = ctx.last_to(chat);
    assert!(welcome.text.contains("Добро пожаловать, Ann"));
    match welcome.kind {
        SentKind::ReplyKeyboard { labels } => {
            assert!(labels.contains(&"Сделать заказ".to_string()));
            assert!(!labels.contains(&"Подтвердить номер телефона".to_string()));
        }
        other => panic!("expected main menu keyboard, got {other:?}"),
    }
}

#[tokio::test]
async fn test_restart_reconnects_by_chat_id() {
    let mut ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(102);
    ctx.seed_address("Main St 1").await;
    ctx.register_customer(chat, "+7 916 000 00 00", "Ann").await;

    // New process: the session map is gone, the identity store is not.
    ctx.restart();
    ctx.messenger.clear();

    ctx.send_text(chat, "/start").await;
    let welcome = ctx.last_to(chat);
    assert!(welcome.text.contains("Добро пожаловать, Ann"));
    assert!(!welcome.text.contains("подтвердите ваш номер"));
}

#[tokio::test]
async fn test_unregistered_start_requests_contact() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(103);

    ctx.send_text(chat, "/start").await;

    let prompt = ctx.last_to(chat);
    assert_eq!(prompt.text, "Пожалуйста, подтвердите ваш номер телефона.");
    match prompt.kind {
        SentKind::ReplyKeyboard { labels } => {
            assert_eq!(labels, vec!["Подтвердить номер телефона".to_string()]);
        }
        other => panic!("expected contact-request keyboard, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_address_catalog_terminates_registration() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(104);

    ctx.send_contact(chat, "+7 916 000 00 00").await;

    let reply = ctx.last_to(chat);
    assert_eq!(
        reply.text,
        "Список адресов доставки недоступен. Свяжитесь с администратором."
    );
    assert!(ctx.state.identity().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_known_phone_links_chat_without_second_profile() {
    let ctx = TestContext::new(sample_menu_for(tomorrow()));
    let chat = ChatId::new(105);
    ctx.seed_profile("+7 916 000 00 00", "Ann", Role::Customer, None)
        .await;

    // Sharing the same phone in a different raw format links, not re-registers.
    ctx.send_contact(chat, "8 916 000 00 00").await;

    let profiles = ctx.state.identity().list().await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].chat_id, Some(chat));
    assert!(ctx.last_to(chat).text.contains("Добро пожаловать, Ann"));
}
