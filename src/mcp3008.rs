use crate::channel::Channel;
use crate::device::ChannelReader;
use crate::error::{BusError, DeviceError};
use crate::reading::Reading;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;
use log::{info, trace, warn};

/// Start bit of a conversion request.
const START: u8 = 0x01;

/// Driver for the MCP3008 8-channel 10-bit converter over SPI.
///
/// The chip select pin is driven by the driver, high while idle.
///
/// Conversions run on a blocking SPI transfer, so `read` never returns
/// [`nb::Error::WouldBlock`] and a stalled bus stalls the caller. The
/// timeout of [`read_blocking`](crate::read_blocking) does not apply.
#[derive(Debug)]
pub struct Mcp3008<SPI, CS> {
    spi: SPI,
    cs: CS,
    active: bool,
}

type Error<SPI, CS> = DeviceError<BusError<<SPI as Transfer<u8>>::Error, <CS as OutputPin>::Error>>;

impl<SPI, CS> Mcp3008<SPI, CS>
where
    SPI: Transfer<u8>,
    CS: OutputPin,
{
    /// Returns an uninitialized driver. Call
    /// [`initialize`](ChannelReader::initialize) before reading.
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self {
            spi,
            cs,
            active: false,
        }
    }

    /// Destroys the driver and returns the bus and chip select pin.
    pub fn free(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    fn convert(&mut self, channel: Channel) -> Result<Reading, Error<SPI, CS>> {
        let mut buffer = [START, channel.command(), 0x00];

        self.cs
            .set_low()
            .map_err(|error| DeviceError::Bus(BusError::ChipSelect(error)))?;

        let transferred = self
            .spi
            .transfer(&mut buffer)
            .map(|response| (u16::from(response[1] & 0x03) << 8) | u16::from(response[2]))
            .map_err(|error| DeviceError::Bus(BusError::Spi(error)));

        let deselected = self
            .cs
            .set_high()
            .map_err(|error| DeviceError::Bus(BusError::ChipSelect(error)));

        let raw = transferred?;
        deselected?;

        trace!("MCP3008 {:?}: {}", channel, raw);
        Ok(Reading::from_masked(raw))
    }
}

impl<SPI, CS> ChannelReader for Mcp3008<SPI, CS>
where
    SPI: Transfer<u8>,
    CS: OutputPin,
{
    type Error = BusError<SPI::Error, CS::Error>;

    fn initialize(&mut self) -> Result<(), DeviceError<Self::Error>> {
        if self.active {
            return Err(DeviceError::AlreadyInitialized);
        }

        self.cs
            .set_high()
            .map_err(|error| DeviceError::Init(BusError::ChipSelect(error)))?;

        self.active = true;
        info!("MCP3008 initialized");

        Ok(())
    }

    fn read(&mut self, channel: Channel) -> nb::Result<Reading, DeviceError<Self::Error>> {
        if !self.active {
            return Err(nb::Error::Other(DeviceError::NotInitialized));
        }

        self.convert(channel).map_err(nb::Error::Other)
    }

    fn dispose(&mut self) {
        if !self.active {
            return;
        }

        if self.cs.set_high().is_err() {
            warn!("MCP3008 chip select could not be released");
        }

        self.active = false;
        info!("MCP3008 disposed");
    }

    fn is_initialized(&self) -> bool {
        self.active
    }
}
