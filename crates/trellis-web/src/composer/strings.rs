//! Localized composer copy
//!
//! Selected by the language subtag of the request locale; anything other
//! than `es` or `fr` gets English.

use chrono::{DateTime, FixedOffset, Timelike};

#[derive(Debug, PartialEq, Eq)]
pub struct Strings {
    pub language: &'static str,
    pub morning: &'static str,
    pub afternoon: &'static str,
    pub evening: &'static str,
    /// Greeting when the time of day is unknown
    pub hello: &'static str,
    pub jobs_summary: &'static str,
    pub pending_sync: &'static str,
    pub no_route_title: &'static str,
    pub no_route_body: &'static str,
    pub stops_label: &'static str,
    pub urgent: &'static str,
    pub start_job: &'static str,
    pub navigate: &'static str,
    pub status_scheduled: &'static str,
    pub status_en_route: &'static str,
    pub status_in_progress: &'static str,
    pub status_completed: &'static str,
}

pub static EN: Strings = Strings {
    language: "en",
    morning: "Good morning",
    afternoon: "Good afternoon",
    evening: "Good evening",
    hello: "Hello",
    jobs_summary: "{{jobs.count}} jobs today",
    pending_sync: "{{sync.pendingCount}} changes waiting to sync",
    no_route_title: "No route assigned",
    no_route_body: "Check back once dispatch assigns your stops.",
    stops_label: "stops",
    urgent: "Urgent",
    start_job: "Start",
    navigate: "Navigate",
    status_scheduled: "Scheduled",
    status_en_route: "En route",
    status_in_progress: "In progress",
    status_completed: "Completed",
};

pub static ES: Strings = Strings {
    language: "es",
    morning: "Buenos días",
    afternoon: "Buenas tardes",
    evening: "Buenas noches",
    hello: "Hola",
    jobs_summary: "{{jobs.count}} trabajos hoy",
    pending_sync: "{{sync.pendingCount}} cambios por sincronizar",
    no_route_title: "Sin ruta asignada",
    no_route_body: "Vuelve cuando despacho asigne tus paradas.",
    stops_label: "paradas",
    urgent: "Urgente",
    start_job: "Iniciar",
    navigate: "Navegar",
    status_scheduled: "Programado",
    status_en_route: "En camino",
    status_in_progress: "En curso",
    status_completed: "Completado",
};

pub static FR: Strings = Strings {
    language: "fr",
    morning: "Bonjour",
    afternoon: "Bon après-midi",
    evening: "Bonsoir",
    hello: "Bonjour",
    jobs_summary: "{{jobs.count}} interventions aujourd'hui",
    pending_sync: "{{sync.pendingCount}} modifications à synchroniser",
    no_route_title: "Aucune tournée assignée",
    no_route_body: "Revenez lorsque la répartition aura assigné vos arrêts.",
    stops_label: "arrêts",
    urgent: "Urgent",
    start_job: "Démarrer",
    navigate: "Itinéraire",
    status_scheduled: "Planifiée",
    status_en_route: "En route",
    status_in_progress: "En cours",
    status_completed: "Terminée",
};

pub fn for_language(language: Option<&str>) -> &'static Strings {
    match language {
        Some("es") => &ES,
        Some("fr") => &FR,
        _ => &EN,
    }
}

impl Strings {
    /// Time-of-day greeting, from the service date rather than the clock.
    /// The hour is read in the date's own offset.
    pub fn greeting(&self, service_date: Option<DateTime<FixedOffset>>, name: Option<&str>) -> String {
        let salutation = match service_date.map(|date| date.hour()) {
            Some(0..=11) => self.morning,
            Some(12..=16) => self.afternoon,
            Some(_) => self.evening,
            None => self.hello,
        };
        match name {
            Some(name) => format!("{salutation}, {name}"),
            None => salutation.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn at(hour: u32) -> Option<DateTime<FixedOffset>> {
        let utc = FixedOffset::east_opt(0).unwrap();
        Some(utc.with_ymd_and_hms(2026, 3, 2, hour, 15, 0).unwrap())
    }

    #[test_case(Some("es"), "es")]
    #[test_case(Some("fr"), "fr")]
    #[test_case(Some("de"), "en")]
    #[test_case(None, "en")]
    fn test_language_selection(language: Option<&str>, expected: &str) {
        assert_eq!(for_language(language).language, expected);
    }

    #[test_case(7, "Good morning, Ava")]
    #[test_case(12, "Good afternoon, Ava")]
    #[test_case(18, "Good evening, Ava")]
    fn test_greeting_by_hour(hour: u32, expected: &str) {
        assert_eq!(EN.greeting(at(hour), Some("Ava")), expected);
    }

    #[test]
    fn test_greeting_uses_caller_offset() {
        // 08:00 in Seattle is 16:00 UTC.
        let seattle = FixedOffset::west_opt(8 * 3600).unwrap();
        let morning = seattle.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        assert_eq!(EN.greeting(Some(morning), Some("Ava")), "Good morning, Ava");

        let kolkata = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let evening = kolkata.with_ymd_and_hms(2026, 3, 2, 20, 0, 0).unwrap();
        assert_eq!(EN.greeting(Some(evening), None), "Good evening");
    }

    #[test]
    fn test_greeting_without_name_or_date() {
        assert_eq!(EN.greeting(None, None), "Hello");
        assert_eq!(ES.greeting(at(9), None), "Buenos días");
    }
}
