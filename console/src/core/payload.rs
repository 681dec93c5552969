//! Payload staging and endpoint assignment
//!
//! One descriptor may occupy the loading bay at a time. Every edit keeps
//! `mass = volume × density(material)`: a volume edit recomputes mass, a
//! mass edit recomputes volume, a material change recomputes mass from the
//! current volume. Committing moves the descriptor to an endpoint only
//! after the gateway confirms the load.

use shared::{Material, PortalId, VOLUME_MAX_M3};

use crate::error::{ConsoleError, ConsoleResult};

#[derive(Debug, Clone, PartialEq)]
pub struct PayloadDescriptor {
    pub material: Material,
    pub volume_m3: f64,
    pub mass_kg: f64,
}

impl PayloadDescriptor {
    /// New descriptor with mass derived from the material density
    pub fn new(material: Material, volume_m3: f64) -> Self {
        Self {
            material,
            volume_m3,
            mass_kg: volume_m3 * material.density(),
        }
    }
}

#[derive(Debug, Default)]
pub struct PayloadLedger {
    staged: Option<PayloadDescriptor>,
    portal1: Option<PayloadDescriptor>,
    portal2: Option<PayloadDescriptor>,
}

impl PayloadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staged(&self) -> Option<&PayloadDescriptor> {
        self.staged.as_ref()
    }

    pub fn assigned(&self, portal: PortalId) -> Option<&PayloadDescriptor> {
        match portal {
            PortalId::One => self.portal1.as_ref(),
            PortalId::Two => self.portal2.as_ref(),
        }
    }

    /// Stage a fresh descriptor in the loading bay, replacing any previous
    /// one. Mass is derived from the density.
    pub fn stage(&mut self, material: Material, volume_m3: f64) -> ConsoleResult<&PayloadDescriptor> {
        validate_volume(volume_m3)?;
        Ok(self.staged.insert(PayloadDescriptor::new(material, volume_m3)))
    }

    /// Edit the staged volume; mass follows from the density.
    pub fn set_volume(&mut self, volume_m3: f64) -> ConsoleResult<&PayloadDescriptor> {
        validate_volume(volume_m3)?;
        let staged = self.staged.as_mut().ok_or(ConsoleError::NothingStaged)?;
        staged.volume_m3 = volume_m3;
        staged.mass_kg = volume_m3 * staged.material.density();
        Ok(staged)
    }

    /// Edit the staged mass; volume follows from the density.
    pub fn set_mass(&mut self, mass_kg: f64) -> ConsoleResult<&PayloadDescriptor> {
        if !(mass_kg > 0.0) {
            return Err(ConsoleError::InvalidParameter {
                message: format!("payload mass must be positive, got {mass_kg}"),
            });
        }
        let staged = self.staged.as_mut().ok_or(ConsoleError::NothingStaged)?;
        staged.mass_kg = mass_kg;
        staged.volume_m3 = mass_kg / staged.material.density();
        Ok(staged)
    }

    /// Swap the staged material; mass is recomputed from the current volume.
    pub fn set_material(&mut self, material: Material) -> ConsoleResult<&PayloadDescriptor> {
        let staged = self.staged.as_mut().ok_or(ConsoleError::NothingStaged)?;
        staged.material = material;
        staged.mass_kg = staged.volume_m3 * material.density();
        Ok(staged)
    }

    /// Pre-flight check for a commit: something staged, endpoint empty.
    /// Both are verified before any network round trip.
    pub fn ensure_can_commit(&self, portal: PortalId) -> ConsoleResult<&PayloadDescriptor> {
        if self.assigned(portal).is_some() {
            return Err(ConsoleError::EndpointOccupied { portal });
        }
        self.staged.as_ref().ok_or(ConsoleError::NothingStaged)
    }

    /// Move the staged descriptor to the endpoint after the gateway
    /// confirmed the load. Clears the loading bay.
    pub fn commit(&mut self, portal: PortalId) -> ConsoleResult<PayloadDescriptor> {
        if self.assigned(portal).is_some() {
            return Err(ConsoleError::EndpointOccupied { portal });
        }
        let descriptor = self.staged.take().ok_or(ConsoleError::NothingStaged)?;
        let slot = match portal {
            PortalId::One => &mut self.portal1,
            PortalId::Two => &mut self.portal2,
        };
        *slot = Some(descriptor.clone());
        Ok(descriptor)
    }

    /// Session reset empties the bay and both endpoints.
    pub fn reset(&mut self) {
        self.staged = None;
        self.portal1 = None;
        self.portal2 = None;
    }
}

fn validate_volume(volume_m3: f64) -> ConsoleResult<()> {
    if volume_m3 > 0.0 && volume_m3 < VOLUME_MAX_M3 {
        Ok(())
    } else {
        Err(ConsoleError::InvalidParameter {
            message: format!("payload volume must be within 0..{VOLUME_MAX_M3} m³, got {volume_m3}"),
        })
    }
}
