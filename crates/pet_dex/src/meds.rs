use chrono::{DateTime, Local, NaiveDate};

use crate::dates::{dd_mm, iso};
use crate::error::RosterError;
use crate::model::{AnimalProfile, HealthLogType, Prescription};

impl Prescription {
    pub fn per_day(&self) -> u32 {
        self.doses_per_day.max(1)
    }

    pub fn total_doses(&self) -> u32 {
        self.total_days.saturating_mul(self.per_day())
    }

    pub fn doses_given_count(&self) -> u32 {
        u32::try_from(self.doses_given.len()).unwrap_or(u32::MAX)
    }

    pub fn doses_left(&self) -> u32 {
        self.total_doses().saturating_sub(self.doses_given_count())
    }

    pub fn doses_on(&self, day: NaiveDate) -> u32 {
        let day = iso(day);
        let count = self.doses_given.iter().filter(|given| **given == day).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Whether another dose may be logged on `day`.
    pub fn accepts_dose(&self, day: NaiveDate) -> bool {
        !self.completed && self.doses_left() > 0 && self.doses_on(day) < self.per_day()
    }
}

/// Form input for a new prescription, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPrescription {
    pub med_name: String,
    pub total_days: u32,
    pub doses_per_day: u32,
    pub notes: String,
}

impl AnimalProfile {
    pub fn active_prescriptions(&self) -> impl Iterator<Item = &Prescription> {
        self.prescriptions.iter().filter(|rx| !rx.completed)
    }

    fn prescription_mut(&mut self, id: &str) -> Result<&mut Prescription, RosterError> {
        self.prescriptions
            .iter_mut()
            .find(|rx| rx.id == id)
            .ok_or_else(|| RosterError::UnknownPrescription(id.to_owned()))
    }

    /// Starts a prescription and returns its id with the status line.
    pub fn add_prescription(
        &mut self,
        form: NewPrescription,
        now: DateTime<Local>,
    ) -> Result<(String, String), RosterError> {
        let name = form.med_name.trim().to_uppercase();
        if name.is_empty() {
            return Err(RosterError::Rejected("NAME THE MEDICATION"));
        }
        if form.total_days < 1 {
            return Err(RosterError::Rejected("DAYS MUST BE 1+"));
        }
        let per_day = form.doses_per_day.max(1);
        let notes = form.notes.trim().to_owned();

        let per_day_label = if per_day > 1 {
            format!(" {per_day}x/day")
        } else {
            String::new()
        };
        let notes_label = if notes.is_empty() {
            String::new()
        } else {
            format!(" ({notes})")
        };
        let text = format!(
            "MEDS: {} - NEW RX: {name} x{}d{per_day_label}{notes_label}",
            dd_mm(now.date_naive()),
            form.total_days
        );
        let id = self.next_log_id(now);
        self.push_log(HealthLogType::Meds, text, "-rx", now)?;

        self.prescriptions.push(Prescription {
            id: id.clone(),
            med_name: name.clone(),
            total_days: form.total_days,
            doses_per_day: per_day,
            doses_given: Vec::new(),
            start_date: iso(now.date_naive()),
            notes,
            completed: false,
        });
        Ok((id, format!("RX: {name} x{}d!", form.total_days)))
    }

    /// Records one dose for today. The prescription completes once every
    /// dose is in.
    pub fn log_dose(&mut self, id: &str, now: DateTime<Local>) -> Result<String, RosterError> {
        let today = now.date_naive();
        let rx = self
            .prescriptions
            .iter()
            .find(|rx| rx.id == id)
            .ok_or_else(|| RosterError::UnknownPrescription(id.to_owned()))?;
        if rx.doses_left() == 0 || rx.completed {
            return Err(RosterError::Rejected("ALL DOSES GIVEN"));
        }
        if rx.doses_on(today) >= rx.per_day() {
            return Err(RosterError::Rejected("TODAY'S DOSES DONE"));
        }
        self.can_add_log(now)?;

        let rx = self.prescription_mut(id)?;
        rx.doses_given.push(iso(today));
        rx.completed = rx.doses_given_count() >= rx.total_doses();
        let (name, given, total, completed) = (
            rx.med_name.clone(),
            rx.doses_given_count(),
            rx.total_doses(),
            rx.completed,
        );

        let done = if completed { " ✓ COMPLETE" } else { "" };
        let text = format!("MEDS: {} - {name} DOSE {given}/{total}{done}", dd_mm(today));
        self.push_log(HealthLogType::Meds, text, "", now)?;
        Ok(format!("{name}: DOSE {given}/{total}"))
    }

    /// Stops a prescription early, keeping the doses already given.
    pub fn end_prescription(
        &mut self,
        id: &str,
        now: DateTime<Local>,
    ) -> Result<String, RosterError> {
        self.can_add_log(now)?;
        let rx = self.prescription_mut(id)?;
        rx.completed = true;
        let text = format!(
            "MEDS: {} - {} ENDED ({}/{} doses)",
            dd_mm(now.date_naive()),
            rx.med_name,
            rx.doses_given.len(),
            rx.total_days
        );
        let message = format!("{}: ENDED", rx.med_name);
        self.push_log(HealthLogType::Meds, text, "", now)?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::roster::Roster;

    fn at(d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 2, d, h, 0, 0).unwrap()
    }

    fn with_rx(days: u32, per_day: u32) -> (AnimalProfile, String) {
        let mut profile = Roster::default().animals.remove(0);
        let (id, _) = profile
            .add_prescription(
                NewPrescription {
                    med_name: " baytril ".into(),
                    total_days: days,
                    doses_per_day: per_day,
                    notes: String::new(),
                },
                at(1, 8),
            )
            .unwrap();
        (profile, id)
    }

    #[test]
    fn new_rx_is_logged() {
        let mut profile = Roster::default().animals.remove(0);
        let (id, message) = profile
            .add_prescription(
                NewPrescription {
                    med_name: "vit-a".into(),
                    total_days: 7,
                    doses_per_day: 2,
                    notes: " with food ".into(),
                },
                at(3, 9),
            )
            .unwrap();

        assert_eq!(message, "RX: VIT-A x7d!");
        let entry = profile.health_log.last().unwrap();
        assert_eq!(entry.id, format!("{id}-rx"));
        assert_eq!(entry.text, "MEDS: 03/02 - NEW RX: VIT-A x7d 2x/day (with food)");
        assert_eq!(profile.prescriptions[0].start_date, "2026-02-03");
    }

    #[test]
    fn invalid_rx_forms_are_rejected() {
        let mut profile = Roster::default().animals.remove(0);
        let blank = NewPrescription {
            med_name: "  ".into(),
            total_days: 3,
            ..NewPrescription::default()
        };
        assert!(profile.add_prescription(blank, at(1, 8)).is_err());
        let no_days = NewPrescription {
            med_name: "x".into(),
            ..NewPrescription::default()
        };
        assert!(profile.add_prescription(no_days, at(1, 8)).is_err());
        assert!(profile.prescriptions.is_empty());
    }

    #[test]
    fn doses_complete_the_course() {
        let (mut profile, id) = with_rx(2, 2);
        assert_eq!(profile.log_dose(&id, at(1, 9)).unwrap(), "BAYTRIL: DOSE 1/4");
        profile.log_dose(&id, at(1, 20)).unwrap();
        assert!(profile.log_dose(&id, at(1, 21)).is_err());

        profile.log_dose(&id, at(2, 9)).unwrap();
        assert_eq!(profile.log_dose(&id, at(2, 20)).unwrap(), "BAYTRIL: DOSE 4/4");
        assert!(profile.prescriptions[0].completed);
        assert_eq!(
            profile.health_log.last().unwrap().text,
            "MEDS: 02/02 - BAYTRIL DOSE 4/4 ✓ COMPLETE"
        );
        assert!(profile.log_dose(&id, at(3, 9)).is_err());
    }

    #[test]
    fn legacy_zero_per_day_means_once() {
        let (mut profile, id) = with_rx(3, 1);
        profile.prescriptions[0].doses_per_day = 0;
        assert_eq!(profile.prescriptions[0].total_doses(), 3);
        profile.log_dose(&id, at(1, 9)).unwrap();
        assert!(!profile.prescriptions[0].accepts_dose(at(1, 9).date_naive()));
        assert!(profile.prescriptions[0].accepts_dose(at(2, 9).date_naive()));
    }

    #[test]
    fn huge_courses_do_not_overflow() {
        let (mut profile, _) = with_rx(3, 1);
        profile.prescriptions[0].total_days = u32::MAX;
        profile.prescriptions[0].doses_per_day = 4;
        assert_eq!(profile.prescriptions[0].total_doses(), u32::MAX);
        assert!(profile.prescriptions[0].accepts_dose(at(1, 9).date_naive()));
    }

    #[test]
    fn ending_early_keeps_the_count() {
        let (mut profile, id) = with_rx(5, 1);
        profile.log_dose(&id, at(1, 9)).unwrap();
        assert_eq!(profile.end_prescription(&id, at(2, 9)).unwrap(), "BAYTRIL: ENDED");
        assert_eq!(
            profile.health_log.last().unwrap().text,
            "MEDS: 02/02 - BAYTRIL ENDED (1/5 doses)"
        );
        assert_eq!(profile.active_prescriptions().count(), 0);
        assert_eq!(
            profile.end_prescription("nope", at(2, 9)),
            Err(RosterError::UnknownPrescription("nope".into()))
        );
    }
}
