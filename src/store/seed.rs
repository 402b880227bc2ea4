// Fixed mock data the store is seeded with at startup.

use crate::models::{Chat, ChatId, ChatKind, DeliveryStatus, Direction, Message, MessageBody, MessageId};

fn chat(id: u32, name: &str, last_message: &str, time: &str, unread: u32, online: bool) -> Chat {
    Chat {
        id: ChatId(id),
        name: name.to_string(),
        last_message: last_message.to_string(),
        time: time.to_string(),
        unread,
        online,
        kind: ChatKind::Direct,
    }
}

fn group(id: u32, name: &str, last_message: &str, time: &str, members: &[&str]) -> Chat {
    Chat {
        kind: ChatKind::Group {
            members: members.iter().map(|m| m.to_string()).collect(),
        },
        ..chat(id, name, last_message, time, 0, false)
    }
}

pub fn mock_chats() -> Vec<Chat> {
    vec![
        chat(1, "Анна Смирнова", "Привет! Как дела?", "14:23", 2, true),
        group(2, "Команда Проекта", "Встреча перенесена на 15:00", "13:45", &["Анна", "Дмитрий", "Мария"]),
        chat(3, "Дмитрий Иванов", "Отправил файлы", "12:30", 5, true),
        chat(4, "Мария Петрова", "Спасибо за помощь!", "11:15", 0, false),
        chat(5, "Алексей Козлов", "Созвонимся завтра?", "10:00", 1, true),
        group(6, "Семья 👨‍👩‍👧‍👦", "Все готово", "Вчера", &["Мама", "Папа", "Сестра"]),
    ]
}

fn seeded(id: u64, text: &str, time: &str, direction: Direction, status: Option<DeliveryStatus>) -> Message {
    Message {
        id: MessageId(id),
        body: MessageBody::Text(text.to_string()),
        time: time.to_string(),
        direction,
        status,
    }
}

/// Opening history of a chat. The first chat carries a short exchange,
/// every other chat opens on its preview line.
pub fn mock_history(chat: &Chat) -> Vec<Message> {
    if chat.id == ChatId(1) {
        return vec![
            seeded(1, "Привет! Как дела?", "14:20", Direction::Incoming, None),
            seeded(
                2,
                "Отлично! Работаю над новым проектом",
                "14:21",
                Direction::Outgoing,
                Some(DeliveryStatus::Read),
            ),
            seeded(3, "Звучит интересно! Расскажешь подробнее?", "14:23", Direction::Incoming, None),
        ];
    }

    vec![seeded(1, &chat.last_message, &chat.time, Direction::Incoming, None)]
}
