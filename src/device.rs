use crate::channel::Channel;
use crate::error::DeviceError;
use crate::reading::Reading;
use std::thread;
use std::time::{Duration, Instant};

/// A converter that can be sampled one channel at a time.
///
/// A reader must be [`initialize`](ChannelReader::initialize)d before it
/// is read, and initializing it again before
/// [`dispose`](ChannelReader::dispose) fails with
/// [`DeviceError::AlreadyInitialized`].
pub trait ChannelReader {
    /// The error type of the underlying bus.
    type Error;

    fn initialize(&mut self) -> Result<(), DeviceError<Self::Error>>;

    /// Starts or continues a conversion on `channel`, returning
    /// [`nb::Error::WouldBlock`] while the result is not ready.
    fn read(&mut self, channel: Channel) -> nb::Result<Reading, DeviceError<Self::Error>>;

    /// Releases the device. Calling this more than once has no effect.
    fn dispose(&mut self);

    fn is_initialized(&self) -> bool;
}

/// Reads `channel`, polling until a conversion completes or `timeout`
/// elapses.
///
/// The timeout only bounds time spent on [`nb::Error::WouldBlock`]. A
/// reader whose `read` blocks inside a single call, as
/// [`Mcp3008`](crate::Mcp3008) does on a blocking SPI transfer, is not
/// interrupted.
///
/// # Examples
///
/// ```
/// use adc_calibrator::{read_blocking, Channel, ChannelReader, Mcp3008};
/// use embedded_hal_mock::{
///     pin::{Mock as PinMock, State as PinState, Transaction as PinTransaction},
///     spi::{Mock as SpiMock, Transaction as SpiTransaction},
/// };
/// use std::time::Duration;
///
/// let spi = SpiMock::new(&[SpiTransaction::transfer(
///     vec![0x01, 0x80, 0x00],
///     vec![0x00, 0x02, 0x00],
/// )]);
/// let cs = PinMock::new(&[
///     PinTransaction::set(PinState::High),
///     PinTransaction::set(PinState::Low),
///     PinTransaction::set(PinState::High),
/// ]);
///
/// let mut adc = Mcp3008::new(spi, cs);
/// adc.initialize().unwrap();
///
/// let reading = read_blocking(&mut adc, Channel::SINGLE[0], Duration::from_millis(100)).unwrap();
/// assert_eq!(reading.raw(), 512);
/// # let (mut spi, mut cs) = adc.free();
/// # spi.done();
/// # cs.done();
/// ```
pub fn read_blocking<R>(
    reader: &mut R,
    channel: Channel,
    timeout: Duration,
) -> Result<Reading, DeviceError<R::Error>>
where
    R: ChannelReader + ?Sized,
{
    let started = Instant::now();

    loop {
        match reader.read(channel) {
            Ok(reading) => return Ok(reading),
            Err(nb::Error::Other(error)) => return Err(error),
            Err(nb::Error::WouldBlock) => {
                if started.elapsed() >= timeout {
                    return Err(DeviceError::Timeout { timeout });
                }

                thread::yield_now();
            }
        }
    }
}
