//! Curated background tracks offered by the sound-test lab and the builder.

pub struct CuratedTrack {
    pub id: &'static str,
    pub label: &'static str,
    pub url: &'static str,
    pub source: &'static str,
    pub license: &'static str,
}

pub const CURATED_TRACKS: &[CuratedTrack] = &[
    CuratedTrack {
        id: "soundhelix-song-01",
        label: "SoundHelix Song 1",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3",
        source: "SoundHelix",
        license: "Free usage with attribution (soundhelix.com)",
    },
    CuratedTrack {
        id: "soundhelix-song-02",
        label: "SoundHelix Song 2",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-2.mp3",
        source: "SoundHelix",
        license: "Free usage with attribution (soundhelix.com)",
    },
    CuratedTrack {
        id: "soundhelix-song-03",
        label: "SoundHelix Song 3",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-3.mp3",
        source: "SoundHelix",
        license: "Free usage with attribution (soundhelix.com)",
    },
    CuratedTrack {
        id: "soundhelix-song-04",
        label: "SoundHelix Song 4",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-4.mp3",
        source: "SoundHelix",
        license: "Free usage with attribution (soundhelix.com)",
    },
];
