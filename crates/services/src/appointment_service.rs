use std::sync::Arc;

use log::info;

use care_core::model::{Appointment, AppointmentDraft, AppointmentId, Reschedule, UserId};

use crate::api::AppointmentApi;
use crate::error::AppointmentServiceError;

/// One user's appointment list and the new-appointment form.
pub struct AppointmentService {
    api: Arc<dyn AppointmentApi>,
    user: UserId,
    appointments: Vec<Appointment>,
}

impl AppointmentService {
    #[must_use]
    pub fn new(api: Arc<dyn AppointmentApi>, user: UserId) -> Self {
        Self {
            api,
            user,
            appointments: Vec::new(),
        }
    }

    #[must_use]
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    /// # Errors
    ///
    /// Returns `AppointmentServiceError::Api` if the list cannot be loaded.
    pub async fn load(&mut self) -> Result<&[Appointment], AppointmentServiceError> {
        self.appointments = self.api.list_appointments(&self.user).await?;
        Ok(&self.appointments)
    }

    /// Create an appointment from `draft`, clearing it on success.
    ///
    /// # Errors
    ///
    /// Returns `AppointmentServiceError::Validation` before any request when a
    /// field is blank, or `AppointmentServiceError::Api`; the draft is kept on
    /// failure.
    pub async fn create(
        &mut self,
        draft: &mut AppointmentDraft,
    ) -> Result<&Appointment, AppointmentServiceError> {
        let request = draft.validate(self.user.clone())?;
        let created = self.api.create_appointment(&request).await?;
        info!("scheduled appointment {} with {}", created.id, created.doctor);
        draft.clear();
        self.appointments.insert(0, created);
        Ok(&self.appointments[0])
    }

    /// # Errors
    ///
    /// Returns `AppointmentServiceError::NotFound` for an id not in the list,
    /// `Validation` for a blank date or time, or `Api` on failure.
    pub async fn reschedule(
        &mut self,
        id: &AppointmentId,
        date: &str,
        time: &str,
    ) -> Result<&Appointment, AppointmentServiceError> {
        let index = self.position(id)?;
        let change = Reschedule::new(date, time)?;
        let updated = self.api.reschedule_appointment(id, &change).await?;
        info!("rescheduled appointment {id} to {} {}", change.date, change.time);
        self.appointments[index] = updated;
        Ok(&self.appointments[index])
    }

    /// # Errors
    ///
    /// Returns `AppointmentServiceError::NotFound` for an id not in the list,
    /// or `Api` on failure; the list is unchanged on failure.
    pub async fn cancel(&mut self, id: &AppointmentId) -> Result<Appointment, AppointmentServiceError> {
        self.position(id)?;
        self.api.cancel_appointment(id).await?;
        info!("cancelled appointment {id}");
        let index = self.position(id)?;
        Ok(self.appointments.remove(index))
    }

    fn position(&self, id: &AppointmentId) -> Result<usize, AppointmentServiceError> {
        self.appointments
            .iter()
            .position(|appointment| &appointment.id == id)
            .ok_or_else(|| AppointmentServiceError::NotFound(id.clone()))
    }
}
