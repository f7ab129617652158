//! Fixed comment categories and the text fragments synthetic comments are
//! assembled from.

pub const CATEGORIES: [&str; 9] = [
    "Водоснабжение и ЖКХ",
    "Дороги / Инфраструктура",
    "Благоустройство",
    "Аварийное жилье",
    "Медицина",
    "Семьи СВО",
    "Молодежь, спорт",
    "Общественный транспорт",
    "Другое",
];

pub const AUTHOR_FIRST_NAMES: [&str; 10] = [
    "Ivan", "Petr", "Sergey", "Mikhail", "Alexey", "Dmitry", "Andrey", "Nikolay", "Roman",
    "Kirill",
];

pub const AUTHOR_LAST_NAMES: [&str; 10] = [
    "Smirnov", "Ivanov", "Petrov", "Sidorov", "Kuznetsov", "Volkov", "Fedorov", "Egorov",
    "Romanov", "Orlov",
];

pub const CITY_PLACES: [&str; 10] = [
    "ул. Ленина",
    "пр. Победы",
    "ул. Гагарина",
    "ул. Центральная",
    "ул. Молодежная",
    "ул. Школьная",
    "мкр. Северный",
    "мкр. Южный",
    "наб. Городская",
    "ул. Советская",
];

pub const BUS_ROUTES: [&str; 10] = ["2", "5", "8", "12", "17", "23", "34", "44", "61", "72"];

pub const CLINICS: [&str; 5] = [
    "поликлиника №1",
    "поликлиника №2",
    "поликлиника №3",
    "детская поликлиника",
    "городская больница",
];

const FALLBACK_TEMPLATES: &[&str] = &[
    "На {place} есть проблема, прошу проверить и дать обратную связь.",
    "Прошу обратить внимание на ситуацию на {place}, ждем решение.",
];

/// Comment templates for a category. Placeholders: `{place}`, `{house}`,
/// `{route}`, `{clinic}`.
pub fn templates_for(category: &str) -> &'static [&'static str] {
    match category {
        "Водоснабжение и ЖКХ" => &[
            "На {place}, дом {house}, с утра нет холодной воды. Уже не первый раз за неделю.",
            "Вечером на {place} вода идет ржавая, невозможно ни помыться, ни постирать.",
            "Почему в доме на {place}, {house}, постоянно скачет напор воды? Сделайте уже нормально.",
            "На {place} опять отключили воду без предупреждения. Можно заранее информировать жителей?",
        ],
        "Дороги / Инфраструктура" => &[
            "На {place} такие ямы, что подвеску жалко. Когда будет ремонт?",
            "После дождя на {place} одно сплошное озеро, пройти пешком невозможно.",
            "На перекрестке у {place} стерлась разметка, в темноте вообще ничего не видно.",
            "На {place}, возле дома {house}, провалился асфальт. Это уже опасно.",
        ],
        "Благоустройство" => &[
            "Во дворе на {place} контейнеры переполнены, мусор уже вокруг лежит.",
            "На {place} давно не убирали, урны полные и листья никто не вывозит.",
            "Поставьте, пожалуйста, освещение на {place}, вечером очень темно и некомфортно.",
            "На детской площадке у {place} сломаны качели, детям просто негде играть.",
        ],
        "Аварийное жилье" => &[
            "В доме на {place}, {house}, трещины по стенам растут. Нужна проверка срочно.",
            "На {place} в подъезде осыпается потолок, страшно заходить.",
            "После дождя на {place}, дом {house}, течет крыша на верхних этажах.",
            "Дом на {place} официально аварийный, но никаких подвижек по расселению нет.",
        ],
        "Медицина" => &[
            "В {clinic} невозможно записаться к терапевту, ближайшая запись только через две недели.",
            "На {place} в аптеке при поликлинике постоянно нет льготных лекарств.",
            "В {clinic} огромные очереди, прием задерживается на 1.5-2 часа.",
            "В {clinic} не работает электронная очередь, люди ругаются в коридоре каждый день.",
        ],
        "Семьи СВО" => &[
            "Подскажите, куда обращаться по выплатам для семей СВО? На местах дают разную информацию.",
            "Заявление для семьи СВО подали давно, а ответа до сих пор нет. Можно ускорить рассмотрение?",
            "Нужна помощь семье СВО с оформлением льгот, на горячей линии никто толком не объясняет.",
            "Почему по поддержке семей СВО в разных окнах разные требования к документам?",
        ],
        "Молодежь, спорт" => &[
            "На {place} спортивная площадка без освещения, после 18:00 уже не позаниматься.",
            "Секция для детей переполнена, добавьте еще группы в районе {place}.",
            "Стадион на {place} закрыт по выходным, хотя это единственное место для тренировок рядом.",
            "В молодежном центре на {place} отменили занятия без предупреждения, это уже не первый раз.",
        ],
        "Общественный транспорт" => &[
            "Автобус №{route} утром едет битком, люди не могут зайти на остановке у {place}.",
            "Маршрут №{route} постоянно опаздывает на 20-30 минут. Можно стабилизировать расписание?",
            "На остановке у {place} нет табло и навеса, в дождь стоять невозможно.",
            "После 21:00 маршрут №{route} почти не ходит, из центра домой не уехать.",
        ],
        "Другое" => &[
            "Подскажите, пожалуйста, куда направить обращение по ситуации на {place}?",
            "На {place} уже несколько дней не работает уличное освещение.",
            "Нужна обратная связь по жалобе, которую оставляли раньше по району {place}.",
            "Проверьте, пожалуйста, состояние территории на {place}, там явный беспорядок.",
        ],
        _ => FALLBACK_TEMPLATES,
    }
}
