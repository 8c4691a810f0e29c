// chat/reply.rs — Assistant reply text generation.
//
// Pure over (input, gender, result count): picks a template uniformly at
// random from the set matching the detected gender, or from the apology set
// when there are no results. Always returns a non-empty string and never
// references a product when the result list is empty.

use rand::seq::SliceRandom;

use super::intent::Gender;

const MALE_REPLIES: &[&str] = &[
    "Tentu! Berikut rekomendasi outfit keren untuk \"{}\" khusus untuk pria:",
    "Saya punya beberapa pilihan outfit stylish untuk \"{}\" buat cowok:",
    "Ini dia beberapa pilihan terbaik untuk \"{}\" yang maskulin dan trendy:",
    "Oke, untuk \"{}\", saya sarankan beberapa outfit berikut khusus untuk Anda:",
];

const FEMALE_REPLIES: &[&str] = &[
    "Tentu! Berikut rekomendasi outfit cantik untuk \"{}\" khusus untuk wanita:",
    "Saya punya beberapa pilihan outfit elegan untuk \"{}\" buat cewek:",
    "Ini dia beberapa pilihan terbaik untuk \"{}\" yang feminin dan fashionable:",
    "Oke, untuk \"{}\", saya sarankan beberapa outfit berikut khusus untuk Anda:",
];

const NEUTRAL_REPLIES: &[&str] = &[
    "Tentu! Berikut rekomendasi outfit yang pas untuk \"{}\":",
    "Saya punya beberapa pilihan outfit keren untuk \"{}\":",
    "Ini dia beberapa pilihan terbaik untuk \"{}\". Semoga suka!",
    "Oke, untuk \"{}\", saya sarankan beberapa outfit berikut:",
];

const APOLOGY_REPLIES: &[&str] = &[
    "Maaf, saya tidak menemukan outfit yang cocok untuk \"{}\". Mungkin Anda bisa coba kata kunci lain?",
    "Hmm, sepertinya saya belum punya rekomendasi untuk \"{}\". Coba deskripsikan acaramu dengan lebih spesifik.",
    "Untuk saat ini, saya belum menemukan yang pas untuk \"{}\". Bagaimana kalau mencari untuk acara lain?",
];

/// Build the assistant's reply line for a recommendation result.
pub fn reply_text(input: &str, gender: Gender, result_count: usize) -> String {
    let templates = if result_count == 0 {
        APOLOGY_REPLIES
    } else {
        match gender {
            Gender::Male => MALE_REPLIES,
            Gender::Female => FEMALE_REPLIES,
            Gender::Neutral => NEUTRAL_REPLIES,
        }
    };
    let template = templates
        .choose(&mut rand::thread_rng())
        .unwrap_or(&templates[0]);
    template.replacen("{}", input, 1)
}
