//! Bot reply texts and keyboard labels (HTML parse mode).

pub const BUTTON_RULES: &str = "📌 Правила питания";
pub const BUTTON_MENU: &str = "📋 Меню";
pub const BUTTON_REPORT_FORMAT: &str = "📝 Правила оформления отчета";

pub const GREETING: &str = "Ок, я на связи. Выбирай 👇";
pub const PICK_MENU: &str = "Выбери меню 👇";
pub const MENU_NOT_FOUND: &str = "Меню не найдено";
pub const NOT_ALLOWED: &str = "⛔ Команда доступна только администраторам.";
pub const PING_DONE: &str = "✅ Напоминания отправлены.";
pub const EXPORT_DONE: &str = "✅ Итоги дня отправлены.";
pub const RESET_DONE: &str = "✅ Отметки за день очищены.";

pub const NUTRITION_RULES: &str = "📌<b>Правила приёма пищи</b>\n\
• <b>Завтрак</b>🥞 — в первый час после пробуждения\n\
• <b>Первый перекус</b>🍎 — спустя 2–4 часа после завтрака (до 11:00)\n\
• <b>Обед</b>🍝 — до 14:00\n\
• <b>Второй перекус</b>🥛 — до 16:00\n\
• <b>Ужин</b> — до 20:00";

pub const REPORT_FORMAT: &str = "📌 <b>ПРАВИЛА ОТЧЁТОВ В ЧАТЕ</b>\n\
Пожалуйста, соблюдаем формат — бот работает автоматически 🤖\n\
Если формат нарушен, отметка может не засчитаться.\n\
\n\
📝 <b>ОБЩЕЕ ПРАВИЛО</b>\n\
➡️ Один приём пищи / вес = одно сообщение\n\
➡️ Не объединяем несколько приёмов пищи в одном тексте\n\
\n\
🍽 <b>КАК ПИСАТЬ ПРИЁМЫ ПИЩИ</b>\n\
Сообщение начинаем с Фамилия (можно с именем), дальше — приём пищи:\n\
Сунко завтрак\n\
Сунко перекус 1\n\
Сунко обед\n\
Сунко перекус 2\n\
Сунко ужин\n\
\n\
⚠️ <b>В первый день желательно писать Фамилия Имя, чтобы бот привязал вас к таблице.</b>\n\
\n\
❌ <b>ЕСЛИ ПРИЁМА ПИЩИ НЕ БУДЕТ</b>\n\
Пишем “не будет” или “без”:\n\
Сунко обед не будет\n\
Сунко без ужина\n\
➡️ В таблице ставится минус (-)\n\
\n\
⚖️ <b>ВЕС</b>\n\
Если пишете разницу от вчера:\n\
Сунко -1.35\n\
Сунко минус 300\n\
Сунко плюс 200\n\
Если первый/абсолютный вес:\n\
Сунко первый вес 80.0\n\
\n\
🌿 <b>ЕСЛИ СЕГОДНЯ БЕЗ ОТЧЁТОВ</b>\n\
Сегодня без отчётов\n\
Уехала до 14 января\n\
➡️ В таблице строка будет зелёной";

pub const SUMMARY_CAPTION_PREFIX: &str = "📊 Итоги дня";

/// Header of the reminder for a meal slot nobody reported.
pub fn missing_report_header(slot_title: &str) -> String {
    format!("⚠️ <b>Не вижу отчёт: {}</b>", slot_title.to_lowercase())
}
