// The fixed catalogue of canonical survey questions.
//
// The thresholds live in the engine; this module only declares which
// questions exist. Questions whose source columns are short, split across
// pages or easily confused go into the priority list, which is matched with
// the stricter threshold.

use survey_recon::{Catalogue, CatalogueErrors};

/// The standard questions, matched against at most one column per file.
/// The order here is the output column order of the aggregate dataset.
const STANDARD_QUESTIONS: [&str; 32] = [
    "Бізнесмен - це той, хто всіма способами ухиляється від сплати податків, має багато грошей і нічого не робить",
    "Бізнесмен - це той, хто забезпечує розвиток економіки і наполегливо працює задля досягнення успіху",
    "В Україні заробляти багато грошей чесним шляхом – неможливо",
    "В Україні існує достатньо можливостей заробляти багато грошей чесним способом",
    "В Україні незаможні люди, зазвичай, є кращими, ніж люди із великими статками",
    "Визнати правду іншого в дискусії – це слабкість, навіть якщо правий інший",
    "Говорити про секс – соромно",
    "Для суспільства культура та мистецтво менш важливі, ніж деякі інші аспекти",
    "За погану дорогу в селі, в першу чергу, несе відповідальність…",
    "Запорукою успіху в житті є…?",
    "Керівництво держави має отримувати заробітну плату не більше ніж середньостатистичний громадянин",
    "ЛГБТ-людей треба вилікувати чи виправити",
    "Мати хороше життя, народившись в селі, майже не реально",
    "Мешканці столиці є більш важливими для суспільства, ніж мешканці сіл і маленьких містечок",
    "Наскільки, на твій погляд, нинішня політична система в Україні дозволяє таким людям, як Ти, впливати на політику?",
    "Наука – це щось нудне й далеке від практичного життя",
    "Помилятись – це погано і ознака поразки та неуспіху",
    "Пропозиції «швидко розбагатіти в інтернеті» можуть бути дійсно хорошими",
    "Що ти думаєш про майбутнє України?",
    "Який основний мотив людей в Україні, які йдуть у політику чи на державну службу?",
    "Якщо щось пішло не так – у першу чергу потрібно знайти винних і покарати їх",
    "Хто така еліта?",
    "Вчитись потрібно в першу чергу тому що…?",
    "Для вирішення проблеми корупції потрібно посадити всіх корупціонерів за грати",
    "Якою мірою слід дозволяти переїжджати до України людям іншої раси чи національності",
    "Який із запропонованих сценаріїв життя був би найбільш прийнятним для тебе?",
    "Ким ти себе перш за все вважаєш?",
    "Якщо є людина, що курила і дожила до 100 років, то куріння не є таким шкідливим, як про це говорять",
    "Чи вважаєш ти себе щасливою людиною? постав позначку на шкалі, де 1 - дуже нещасливий, 5 - дуже щасливий",
    "Для мене гідність залежить від мого успіху та визнання іншими",
    "Кому ти найбільше довіряєш?",
    "Якщо щось пішло не так – у першу чергу треба знайти винних і покарати чи знайти збої в системі і причини помилки? 1 - знайти винних; 5 - знайти збої і причини",
];

/// The priority questions: split or repeated across several columns in some
/// exports, so every qualifying column is collected.
const PRIORITY_QUESTIONS: [&str; 4] = [
    "Вкажи, будь ласка, свій вік",
    "Вкажи, будь ласка, свою стать",
    "З якими проблемами ти можеш звернутися до батьків або інших дорослих, які про тебе піклуються?",
    "Чи вистачає тобі спілкування з батьками/іншими дорослими, які тебе опікають?",
];

pub fn catalogue() -> Result<Catalogue, CatalogueErrors> {
    Catalogue::new(
        STANDARD_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        PRIORITY_QUESTIONS.iter().map(|q| q.to_string()).collect(),
    )?
    .with_display_label("Вкажи, будь ласка, свій вік", "Вік")?
    .with_display_label("Вкажи, будь ласка, свою стать", "Стать")?
    // Some exports pad the elite answers with hyphens.
    .with_hyphen_stripping("Хто така еліта?")
}
