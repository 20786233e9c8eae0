//! touchIt request/response exchanges
//!
//! Each exchange encodes a request, writes it whole, then reads and
//! validates the command's fixed-length response. Nothing is retried.

use core::fmt;

use log::{debug, info, trace, warn};
use touchit_hal::Transport;
use touchit_protocol::{
    Address, Frame, FrameError, InterruptConfig, Position, Request, Touch, Version,
    MAX_FRAME_SIZE,
};

/// Errors from a single exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus transfer failed or moved fewer bytes than asked
    Transport(E),
    /// The response failed validation
    Frame(FrameError),
}

impl<E> From<FrameError> for Error<E> {
    fn from(e: FrameError) -> Self {
        Error::Frame(e)
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {e}"),
            Error::Frame(e) => write!(f, "frame error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            Error::Frame(e) => Some(e),
        }
    }
}

/// A touchIt sensor on a transport
pub struct TouchIt<T> {
    transport: T,
    address: Address,
}

impl<T: Transport> TouchIt<T> {
    /// Create a driver for the sensor at `address`
    pub fn new(transport: T, address: Address) -> Self {
        Self { transport, address }
    }

    /// Address requests are currently sent to
    pub fn address(&self) -> Address {
        self.address
    }

    /// Give back the transport
    pub fn release(self) -> T {
        self.transport
    }

    /// Check if the sensor is holding its interrupt line low
    pub fn event_pending(&mut self) -> bool {
        self.transport.is_low()
    }

    /// Read the firmware version
    pub fn version(&mut self) -> Result<Version, Error<T::Error>> {
        let frame = self.exchange(Request::GetVersion)?;
        Ok(Version::from_frame(&frame)?)
    }

    /// Select the events that pull the interrupt line low
    ///
    /// The sensor acknowledges with an empty response; only its framing is checked.
    pub fn set_config(&mut self, config: InterruptConfig) -> Result<(), Error<T::Error>> {
        self.exchange(Request::SetConfig(config))?;
        Ok(())
    }

    /// Move the sensor to a new bus address
    ///
    /// The sensor switches as soon as the request is written and sends no
    /// confirmation. Later requests go to `new_address`.
    pub fn set_address(&mut self, new_address: Address) -> Result<(), Error<T::Error>> {
        self.send(&Request::SetAddress(new_address))?;
        info!("Sensor address changed {} -> {}", self.address, new_address);
        self.address = new_address;
        Ok(())
    }

    /// Read the coarse touch position
    pub fn touch(&mut self) -> Result<Touch, Error<T::Error>> {
        let frame = self.exchange(Request::GetTouch)?;
        Ok(Touch::from_frame(&frame)?)
    }

    /// Read the fine x/y position
    pub fn position(&mut self) -> Result<Position, Error<T::Error>> {
        let frame = self.exchange(Request::GetPosition)?;
        Ok(Position::from_frame(&frame)?)
    }

    /// Read the firmware version, logging instead of failing
    pub fn identify(&mut self) -> Option<Version> {
        match self.version() {
            Ok(version) => {
                info!("touchIt firmware {version}");
                Some(version)
            }
            Err(e) => {
                warn!("Version query failed, firmware version unknown: {e:?}");
                None
            }
        }
    }

    /// Apply `config`, logging instead of failing
    ///
    /// Returns whether the sensor acknowledged. On failure the sensor keeps
    /// its previous configuration.
    pub fn configure(&mut self, config: InterruptConfig) -> bool {
        match self.set_config(config) {
            Ok(()) => {
                debug!("Interrupt config {:#04x} acknowledged", config.bits());
                true
            }
            Err(e) => {
                warn!("Config write failed, configuration unchanged: {e:?}");
                false
            }
        }
    }

    fn send(&mut self, request: &Request) -> Result<(), Error<T::Error>> {
        let bytes = request.to_frame()?.encode_to_vec()?;
        trace!("TX {:?} {:02x?}", request.command(), bytes.as_slice());
        self.transport
            .write(self.address.get(), &bytes)
            .map_err(Error::Transport)
    }

    fn exchange(&mut self, request: Request) -> Result<Frame, Error<T::Error>> {
        self.send(&request)?;

        // Only SetAddress has no response, and it never comes through here
        let len = request.response_len().unwrap_or(0);
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let raw = &mut buffer[..len];
        self.transport
            .read(self.address.get(), raw)
            .map_err(Error::Transport)?;
        trace!("RX {:?} {:02x?}", request.command(), raw);

        Ok(Frame::decode(raw, len)?)
    }
}
